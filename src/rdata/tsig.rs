//! The TSIG record of RFC 8945.
//!
//! A TSIG record is only valid as the very last record of a message.
//! Signing and verification are done by [`crate::tsig`].

use super::{compose_name, RecordData};
use crate::base::iana::{Rtype, TsigRcode};
use crate::base::name::{Compressor, Name};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{
    compose_u48, parse_slice, parse_u48, Parse, ParseError,
};
use crate::utils::base64;
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;
use std::time::SystemTime;

//------------ Tsig ----------------------------------------------------------

/// The data of a TSIG record.
///
/// Both the MAC and the other data are limited to 65535 octets since they
/// carry a 16 bit length on the wire.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tsig {
    algorithm: Name,
    time_signed: Time48,
    fudge: u16,
    mac: Bytes,
    original_id: u16,
    error: TsigRcode,
    other: Bytes,
}

impl Tsig {
    /// Returns `None` if the MAC or the other data is too long.
    #[must_use]
    pub fn new(
        algorithm: Name,
        time_signed: Time48,
        fudge: u16,
        mac: Bytes,
        original_id: u16,
        error: TsigRcode,
        other: Bytes,
    ) -> Option<Self> {
        if mac.len() > usize::from(u16::MAX)
            || other.len() > usize::from(u16::MAX)
        {
            return None;
        }
        Some(Self::new_unchecked(
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        ))
    }

    /// The caller guarantees both lengths fit into 16 bits.
    pub(crate) fn new_unchecked(
        algorithm: Name,
        time_signed: Time48,
        fudge: u16,
        mac: Bytes,
        original_id: u16,
        error: TsigRcode,
        other: Bytes,
    ) -> Self {
        Tsig {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        }
    }

    /// The algorithm, spelled as a domain name such as `hmac-sha256.`.
    #[must_use]
    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Seconds since the Unix epoch at signing.
    #[must_use]
    pub fn time_signed(&self) -> Time48 {
        self.time_signed
    }

    /// Allowed clock skew in seconds.
    #[must_use]
    pub fn fudge(&self) -> u16 {
        self.fudge
    }

    #[must_use]
    pub fn mac(&self) -> &Bytes {
        &self.mac
    }

    /// The message ID at signing, which forwarders may have changed since.
    #[must_use]
    pub fn original_id(&self) -> u16 {
        self.original_id
    }

    #[must_use]
    pub fn error(&self) -> TsigRcode {
        self.error
    }

    /// Empty except for BADTIME, where it holds the server’s clock.
    #[must_use]
    pub fn other(&self) -> &Bytes {
        &self.other
    }

    /// Decodes the other data as a timestamp if it is six octets long.
    #[must_use]
    pub fn other_time(&self) -> Option<Time48> {
        if self.other.len() == 6 {
            let mut buf = [0u8; 6];
            buf.copy_from_slice(&self.other);
            Some(Time48::from_octets(buf))
        } else {
            None
        }
    }

    /// Whether `now` lies within `fudge` seconds of the signing time.
    #[must_use]
    pub fn is_valid_at(&self, now: Time48) -> bool {
        now.eq_fudged(self.time_signed, self.fudge.into())
    }

    #[must_use]
    pub fn is_valid_now(&self) -> bool {
        self.is_valid_at(Time48::now())
    }
}

impl RecordData for Tsig {
    const RTYPE: Rtype = Rtype::Tsig;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        _rdlen: usize,
    ) -> Result<Self, ParseError> {
        let algorithm = Name::parse(parser)?;
        let time_signed = Time48::parse(parser)?;
        let fudge = parser.parse_u16_be()?;
        let mac_size = parser.parse_u16_be()?;
        let mac = Bytes::copy_from_slice(parse_slice(
            parser,
            mac_size.into(),
        )?);
        let original_id = parser.parse_u16_be()?;
        let error = TsigRcode::from_int(parser.parse_u16_be()?);
        let other_len = parser.parse_u16_be()?;
        let other = Bytes::copy_from_slice(parse_slice(
            parser,
            other_len.into(),
        )?);
        Ok(Tsig {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let algorithm = scanner.scan_name()?;
        let time_signed = Time48::from_u64(scan_u48(scanner)?);
        let fudge = scanner.scan()?;
        let mac = scan_sized_base64(scanner)?;
        let original_id = scanner.scan()?;
        let error = scanner.scan_str()?;
        let error = TsigRcode::from_str(error).map_err(|_| {
            ScanError::custom(format!("invalid TSIG error '{}'", error))
        })?;
        let other = scan_sized_base64(scanner)?;
        Ok(Tsig {
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        })
    }

    fn compose_rdata(&self, target: &mut BytesMut, _: Option<&mut Compressor>) {
        compose_name(&self.algorithm, target, None);
        self.time_signed.compose(target);
        target.put_u16(self.fudge);
        target.put_u16(self.mac.len() as u16);
        target.put_slice(&self.mac);
        target.put_u16(self.original_id);
        target.put_u16(self.error.to_int());
        target.put_u16(self.other.len() as u16);
        target.put_slice(&self.other);
    }

    fn compose_canonical_rdata(&self, target: &mut BytesMut) {
        // The algorithm name is not lowercased in canonical form.
        self.compose_rdata(target, None)
    }
}

fn scan_u48(scanner: &mut Scanner) -> Result<u64, ScanError> {
    let token = scanner.scan_str()?;
    match token.parse::<u64>() {
        Ok(value) if value < 1 << 48 => Ok(value),
        _ => Err(ScanError::custom(format!(
            "invalid 48 bit time '{}'",
            token
        ))),
    }
}

/// Scans a length followed by base 64 data if the length isn’t zero.
fn scan_sized_base64(scanner: &mut Scanner) -> Result<Bytes, ScanError> {
    let len: u16 = scanner.scan()?;
    if len == 0 {
        return Ok(Bytes::new());
    }
    let data = base64::decode_vec(scanner.scan_str()?)
        .map_err(|err| ScanError::custom(format!("invalid base64: {}", err)))?;
    if data.len() != usize::from(len) {
        return Err(ScanError::custom("base64 data has wrong length"));
    }
    Ok(data.into())
}

impl fmt::Display for Tsig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.algorithm,
            self.time_signed,
            self.fudge,
            self.mac.len()
        )?;
        if !self.mac.is_empty() {
            f.write_str(" ")?;
            base64::display(&self.mac, f)?;
        }
        write!(f, " {} {} {}", self.original_id, self.error, self.other.len())?;
        if !self.other.is_empty() {
            f.write_str(" ")?;
            base64::display(&self.other, f)?;
        }
        Ok(())
    }
}

//------------ Time48 --------------------------------------------------------

/// Unix time as carried in TSIG: 48 bits, network byte order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time48(u64);

impl Time48 {
    /// A clock before 1970 reads as zero.
    #[must_use]
    pub fn now() -> Time48 {
        Self::from_u64(
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|dur| dur.as_secs())
                .unwrap_or(0),
        )
    }

    /// Keeps only the lower 48 bits of `value`.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Time48(value & 0x0000_FFFF_FFFF_FFFF)
    }

    #[must_use]
    pub fn from_octets(octets: [u8; 6]) -> Self {
        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&octets);
        Time48(u64::from_be_bytes(buf))
    }

    #[must_use]
    pub fn into_int(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn into_octets(self) -> [u8; 6] {
        let mut res = [0u8; 6];
        res.copy_from_slice(&self.0.to_be_bytes()[2..]);
        res
    }

    /// Returns whether the time is within a given period.
    ///
    /// Returns `true` iff `other` is at most `fudge` seconds before or after
    /// this value’s time.
    #[must_use]
    pub fn eq_fudged(self, other: Self, fudge: u64) -> bool {
        self.0.saturating_sub(fudge) <= other.0
            && self.0.saturating_add(fudge) >= other.0
    }

    pub fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        parse_u48(parser).map(Time48)
    }

    pub fn compose(self, target: &mut BytesMut) {
        compose_u48(target, self.0)
    }
}

//--- From

impl From<Time48> for u64 {
    fn from(value: Time48) -> u64 {
        value.0
    }
}

impl fmt::Display for Time48 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//============ Testing =======================================================
