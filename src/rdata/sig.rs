//! Signature record data: SIG from [RFC 2535] and RRSIG from [RFC 4034].
//!
//! Both types share the same layout. This crate does not create or check
//! these signatures but it needs to recognize them so that they travel
//! with the record sets they cover.
//!
//! [RFC 2535]: https://tools.ietf.org/html/rfc2535
//! [RFC 4034]: https://tools.ietf.org/html/rfc4034

use super::{compose_name, RecordData};
use crate::base::iana::Rtype;
use crate::base::name::{Compressor, Name};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{parse_slice, Parse, ParseError};
use crate::utils::base64;
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

//------------ Timestamp -----------------------------------------------------

/// A signature timestamp.
///
/// Timestamps are seconds since the Unix epoch modulo 2^32. In
/// representation format, they are given as `YYYYMMDDHHmmSS` in UTC or as
/// a plain number of seconds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Timestamp(u32);

impl Timestamp {
    #[must_use]
    pub fn from_int(value: u32) -> Self {
        Timestamp(value)
    }

    #[must_use]
    pub fn into_int(self) -> u32 {
        self.0
    }

    fn date_time(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(i64::from(self.0)).ok()
    }
}

impl FromStr for Timestamp {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScanError::custom(format!("invalid timestamp '{}'", s));
        if !s.bytes().all(|ch| ch.is_ascii_digit()) {
            return Err(err());
        }
        if s.len() != 14 {
            return s.parse().map(Timestamp).map_err(|_| err());
        }
        let num = |range: core::ops::Range<usize>| -> Result<u16, ScanError> {
            s[range].parse().map_err(|_| err())
        };
        let month = Month::try_from(num(4..6)? as u8).map_err(|_| err())?;
        let date = Date::from_calendar_date(
            i32::from(num(0..4)?),
            month,
            num(6..8)? as u8,
        )
        .map_err(|_| err())?;
        let time =
            Time::from_hms(num(8..10)? as u8, num(10..12)? as u8, num(12..14)? as u8)
                .map_err(|_| err())?;
        let secs = PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp();
        Ok(Timestamp(secs as u32))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.date_time() {
            Some(dt) => write!(
                f,
                "{:04}{:02}{:02}{:02}{:02}{:02}",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            None => write!(f, "{}", self.0),
        }
    }
}

//------------ Sig and Rrsig -------------------------------------------------

macro_rules! sig_type {
    ( $(#[$attr:meta])* $target:ident ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            type_covered: Rtype,
            algorithm: u8,
            labels: u8,
            original_ttl: u32,
            expiration: Timestamp,
            inception: Timestamp,
            key_tag: u16,
            signer_name: Name,
            signature: Bytes,
        }

        impl $target {
            #[allow(clippy::too_many_arguments)]
            #[must_use]
            pub fn new(
                type_covered: Rtype,
                algorithm: u8,
                labels: u8,
                original_ttl: u32,
                expiration: Timestamp,
                inception: Timestamp,
                key_tag: u16,
                signer_name: Name,
                signature: Bytes,
            ) -> Self {
                $target {
                    type_covered,
                    algorithm,
                    labels,
                    original_ttl,
                    expiration,
                    inception,
                    key_tag,
                    signer_name,
                    signature,
                }
            }

            /// The record type of the record set covered by the signature.
            #[must_use]
            pub fn type_covered(&self) -> Rtype {
                self.type_covered
            }

            #[must_use]
            pub fn algorithm(&self) -> u8 {
                self.algorithm
            }

            #[must_use]
            pub fn labels(&self) -> u8 {
                self.labels
            }

            #[must_use]
            pub fn original_ttl(&self) -> u32 {
                self.original_ttl
            }

            #[must_use]
            pub fn expiration(&self) -> Timestamp {
                self.expiration
            }

            #[must_use]
            pub fn inception(&self) -> Timestamp {
                self.inception
            }

            #[must_use]
            pub fn key_tag(&self) -> u16 {
                self.key_tag
            }

            #[must_use]
            pub fn signer_name(&self) -> &Name {
                &self.signer_name
            }

            #[must_use]
            pub fn signature(&self) -> &Bytes {
                &self.signature
            }

            fn compose_head(&self, target: &mut BytesMut) {
                target.put_u16(self.type_covered.to_int());
                target.put_u8(self.algorithm);
                target.put_u8(self.labels);
                target.put_u32(self.original_ttl);
                target.put_u32(self.expiration.into_int());
                target.put_u32(self.inception.into_int());
                target.put_u16(self.key_tag);
            }
        }

        impl RecordData for $target {
            const RTYPE: Rtype = Rtype::$target;

            fn parse_rdata(
                parser: &mut Parser<[u8]>,
                rdlen: usize,
            ) -> Result<Self, ParseError> {
                let end = parser.pos() + rdlen;
                let type_covered = parser.parse_u16_be()?.into();
                let algorithm = parser.parse_u8()?;
                let labels = parser.parse_u8()?;
                let original_ttl = parser.parse_u32_be()?;
                let expiration = Timestamp(parser.parse_u32_be()?);
                let inception = Timestamp(parser.parse_u32_be()?);
                let key_tag = parser.parse_u16_be()?;
                let signer_name = Name::parse(parser)?;
                let len = end.checked_sub(parser.pos()).ok_or_else(|| {
                    ParseError::form_error("signer name exceeds record data")
                })?;
                let signature = Bytes::copy_from_slice(
                    parse_slice(parser, len)?
                );
                Ok(Self::new(
                    type_covered, algorithm, labels, original_ttl,
                    expiration, inception, key_tag, signer_name, signature,
                ))
            }

            fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
                let type_covered = scanner.scan_str()?;
                let type_covered = Rtype::from_str(type_covered).map_err(|_| {
                    ScanError::custom(format!(
                        "unknown record type '{}'", type_covered
                    ))
                })?;
                let algorithm = scanner.scan()?;
                let labels = scanner.scan()?;
                let original_ttl = scanner.scan_ttl()?;
                let expiration = scanner.scan_str()?.parse()?;
                let inception = scanner.scan_str()?.parse()?;
                let key_tag = scanner.scan()?;
                let signer_name = scanner.scan_name()?;
                let signature = base64::decode_vec(&scanner.scan_remaining())
                    .map_err(|err| ScanError::custom(format!(
                        "invalid signature: {}", err
                    )))?;
                Ok(Self::new(
                    type_covered, algorithm, labels, original_ttl,
                    expiration, inception, key_tag, signer_name,
                    signature.into(),
                ))
            }

            fn compose_rdata(
                &self,
                target: &mut BytesMut,
                _: Option<&mut Compressor>,
            ) {
                self.compose_head(target);
                compose_name(&self.signer_name, target, None);
                target.put_slice(&self.signature);
            }

            fn compose_canonical_rdata(&self, target: &mut BytesMut) {
                self.compose_head(target);
                self.signer_name.compose_canonical(target);
                target.put_slice(&self.signature);
            }
        }

        impl fmt::Display for $target {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    f, "{} {} {} {} {} {} {} {} ",
                    self.type_covered, self.algorithm, self.labels,
                    self.original_ttl, self.expiration, self.inception,
                    self.key_tag, self.signer_name
                )?;
                base64::display(&self.signature, f)
            }
        }
    }
}

sig_type! {
    /// SIG record data.
    ///
    /// This is the original signature record. Today, it is only used for
    /// SIG(0) transaction signatures.
    Sig
}

sig_type! {
    /// RRSIG record data.
    ///
    /// RRSIG records hold the DNSSEC signature for a record set.
    Rrsig
}

//============ Testing =======================================================
