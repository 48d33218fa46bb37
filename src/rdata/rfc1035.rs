//! Record data from [RFC 1035]: initial record types.
//!
//! This RFC defines the initial set of record types. Of those, this module
//! provides the ones still relevant today: A, NS, CNAME, SOA, PTR, MX, and
//! TXT. Their domain names are the only ones that may be compressed in
//! messages.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::{compose_name, RecordData};
use crate::base::iana::Rtype;
use crate::base::name::{Compressor, Name, NameError};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{parse_slice, Parse, ParseError};
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;
use std::net::Ipv4Addr;

//------------ A -------------------------------------------------------------

/// A record data.
///
/// A records convey the IPv4 address of a host.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct A {
    addr: Ipv4Addr,
}

impl A {
    /// Creates new A record data from an IPv4 address.
    #[must_use]
    pub fn new(addr: Ipv4Addr) -> A {
        A { addr }
    }

    /// Returns the address.
    #[must_use]
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }
}

impl From<Ipv4Addr> for A {
    fn from(addr: Ipv4Addr) -> Self {
        Self::new(addr)
    }
}

impl FromStr for A {
    type Err = <Ipv4Addr as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4Addr::from_str(s).map(A::new)
    }
}

impl RecordData for A {
    const RTYPE: Rtype = Rtype::A;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        _rdlen: usize,
    ) -> Result<Self, ParseError> {
        let mut buf = [0u8; 4];
        parser.parse_buf(&mut buf)?;
        Ok(Self::new(buf.into()))
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let token = scanner.scan_str()?;
        A::from_str(token).map_err(|_| {
            ScanError::custom(format!("invalid IPv4 address '{}'", token))
        })
    }

    fn compose_rdata(&self, target: &mut BytesMut, _: Option<&mut Compressor>) {
        target.put_slice(&self.addr.octets())
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}

//------------ Cname, Ns, Ptr ------------------------------------------------

name_type! {
    /// CNAME record data.
    ///
    /// The CNAME record specifies the canonical or primary name for domain
    /// name alias.
    (Cname, Cname, cname, true)
}

name_type! {
    /// NS record data.
    ///
    /// NS records specify hosts that are authoritative for a class and
    /// domain.
    (Ns, Ns, nsdname, true)
}

name_type! {
    /// PTR record data.
    ///
    /// PRT records are used in special domains to point to some other
    /// location in the domain space.
    (Ptr, Ptr, ptrdname, true)
}

//------------ Mx ------------------------------------------------------------

/// MX record data.
///
/// The MX record specifies a host willing to serve as a mail exchange for
/// the owner name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Mx {
    preference: u16,
    exchange: Name,
}

impl Mx {
    /// Creates new MX record data from the components.
    #[must_use]
    pub fn new(preference: u16, exchange: Name) -> Self {
        Mx {
            preference,
            exchange,
        }
    }

    /// The preference for this record.
    ///
    /// Defines an order if there are several MX records for the same owner.
    /// Lower values are preferred.
    #[must_use]
    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// The name of the host that is the exchange.
    #[must_use]
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }
}

impl RecordData for Mx {
    const RTYPE: Rtype = Rtype::Mx;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        _rdlen: usize,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(parser.parse_u16_be()?, Name::parse(parser)?))
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(scanner.scan()?, scanner.scan_name()?))
    }

    fn compose_rdata(
        &self,
        target: &mut BytesMut,
        compressor: Option<&mut Compressor>,
    ) {
        target.put_u16(self.preference);
        compose_name(&self.exchange, target, compressor)
    }

    fn compose_canonical_rdata(&self, target: &mut BytesMut) {
        target.put_u16(self.preference);
        self.exchange.compose_canonical(target)
    }
}

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

//------------ Soa -----------------------------------------------------------

/// SOA record data.
///
/// SOA records mark the top of a zone and contain information pertinent to
/// name server maintenance operations.
///
/// The SOA record type is defined in RFC 1035, section 3.3.13.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    mname: Name,
    rname: Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
}

impl Soa {
    /// Creates new SOA record data from content.
    #[must_use]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// The primary name server for the zone.
    #[must_use]
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// The mailbox for the person responsible for this zone.
    #[must_use]
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// The serial number of the original copy of the zone.
    #[must_use]
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// The time interval before the zone should be refreshed.
    #[must_use]
    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    /// The time before a failed refresh is retried.
    #[must_use]
    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// The upper limit of time the zone is authoritative.
    #[must_use]
    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// The TTL to be used for negative answers.
    #[must_use]
    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    fn compose_numbers(&self, target: &mut BytesMut) {
        target.put_u32(self.serial);
        target.put_u32(self.refresh);
        target.put_u32(self.retry);
        target.put_u32(self.expire);
        target.put_u32(self.minimum);
    }
}

impl RecordData for Soa {
    const RTYPE: Rtype = Rtype::Soa;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        _rdlen: usize,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(
            Name::parse(parser)?,
            Name::parse(parser)?,
            parser.parse_u32_be()?,
            parser.parse_u32_be()?,
            parser.parse_u32_be()?,
            parser.parse_u32_be()?,
            parser.parse_u32_be()?,
        ))
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_name()?,
            scanner.scan_name()?,
            scanner.scan()?,
            scanner.scan_ttl()?,
            scanner.scan_ttl()?,
            scanner.scan_ttl()?,
            scanner.scan_ttl()?,
        ))
    }

    fn compose_rdata(
        &self,
        target: &mut BytesMut,
        mut compressor: Option<&mut Compressor>,
    ) {
        compose_name(&self.mname, target, compressor.as_deref_mut());
        compose_name(&self.rname, target, compressor);
        self.compose_numbers(target);
    }

    fn compose_canonical_rdata(&self, target: &mut BytesMut) {
        self.mname.compose_canonical(target);
        self.rname.compose_canonical(target);
        self.compose_numbers(target);
    }
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

//------------ Txt -----------------------------------------------------------

/// TXT record data.
///
/// TXT records hold descriptive text. The data is a sequence of character
/// strings of up to 255 octets each.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Txt {
    strings: Vec<Bytes>,
}

impl Txt {
    /// Creates TXT record data from a sequence of character strings.
    ///
    /// Returns `None` if any of the strings is longer than 255 octets.
    #[must_use]
    pub fn new(strings: Vec<Bytes>) -> Option<Self> {
        if strings.iter().any(|s| s.len() > 255) {
            None
        } else {
            Some(Txt { strings })
        }
    }

    /// Creates TXT record data from text, splitting it as necessary.
    #[must_use]
    pub fn from_text(text: &[u8]) -> Self {
        let strings = if text.is_empty() {
            vec![Bytes::new()]
        } else {
            text.chunks(255).map(Bytes::copy_from_slice).collect()
        };
        Txt { strings }
    }

    /// Returns an iterator over the character strings.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.strings.iter().map(AsRef::as_ref)
    }

    /// Returns the concatenated content of all character strings.
    #[must_use]
    pub fn text(&self) -> Vec<u8> {
        self.strings.concat()
    }
}

impl RecordData for Txt {
    const RTYPE: Rtype = Rtype::Txt;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        let end = parser.pos() + rdlen;
        let mut strings = Vec::new();
        while parser.pos() < end {
            let len = usize::from(parser.parse_u8()?);
            strings.push(Bytes::copy_from_slice(parse_slice(parser, len)?));
        }
        Ok(Txt { strings })
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let mut strings = vec![scanner.scan_charstr()?];
        while !scanner.is_empty() {
            strings.push(scanner.scan_charstr()?);
        }
        Ok(Txt { strings })
    }

    fn compose_rdata(&self, target: &mut BytesMut, _: Option<&mut Compressor>) {
        for s in &self.strings {
            target.put_u8(s.len() as u8);
            target.put_slice(s);
        }
    }
}

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";
        for s in &self.strings {
            f.write_str(sep)?;
            display_charstr(s, f)?;
            sep = " ";
        }
        Ok(())
    }
}

/// Writes a character string as a quoted string.
pub(crate) fn display_charstr(s: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("\"")?;
    for &ch in s {
        if ch == b'"' || ch == b'\\' {
            write!(f, "\\{}", ch as char)?;
        } else if (0x20..0x7F).contains(&ch) {
            write!(f, "{}", ch as char)?;
        } else {
            write!(f, "\\{:03}", ch)?;
        }
    }
    f.write_str("\"")
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::{check_round_trip, scan};
    use crate::rdata::AllRecordData;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn round_trips() {
        check_round_trip(&A::from_str("192.0.2.1").unwrap().into());
        check_round_trip(&Ns::new(name("ns.example.com.")).into());
        check_round_trip(&Cname::new(name("www.example.com.")).into());
        check_round_trip(&Ptr::new(name("host.example.")).into());
        check_round_trip(&Mx::new(10, name("mail.example.com.")).into());
        check_round_trip(
            &Soa::new(
                name("ns.example.com."),
                name("hostmaster.example.com."),
                2024010101,
                7200,
                900,
                1209600,
                300,
            )
            .into(),
        );
        check_round_trip(
            &Txt::new(vec![
                Bytes::from_static(b"v=spf1 -all"),
                Bytes::from_static(b"quote\" and \\ \x01"),
            ])
            .unwrap()
            .into(),
        );
    }

    #[test]
    fn scan_soa_with_units() {
        let data = scan(
            Rtype::Soa,
            "ns.example. host.example. ( 1 2h 15m 2w 5m )",
        )
        .unwrap();
        match data {
            AllRecordData::Soa(soa) => {
                assert_eq!(soa.refresh(), 7200);
                assert_eq!(soa.expire(), 1_209_600);
                assert_eq!(soa.minimum(), 300);
            }
            _ => panic!("not an SOA"),
        }
    }

    #[test]
    fn compressed_names() {
        let mut compressor = Compressor::new();
        let mut buf = BytesMut::new();
        Mx::new(10, name("mail.example.com."))
            .compose_rdata(&mut buf, Some(&mut compressor));
        Mx::new(20, name("mail.example.com."))
            .compose_rdata(&mut buf, Some(&mut compressor));
        assert_eq!(&buf[buf.len() - 4..], b"\0\x14\xc0\x02");
    }

    #[test]
    fn txt_from_text() {
        let long = vec![b'x'; 300];
        let txt = Txt::from_text(&long);
        assert_eq!(txt.iter().map(<[u8]>::len).collect::<Vec<_>>(), [255, 45]);
        assert_eq!(txt.text(), long);
        assert!(Txt::new(vec![Bytes::from(long)]).is_none());
    }
}
