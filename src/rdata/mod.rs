//! Resource data implementations.
//!
//! This module contains the record data types for the record types this
//! crate knows about. Each of them implements the [`RecordData`] trait
//! which covers parsing from and composing into wire format as well as
//! scanning from representation format. Display produces the
//! representation format.
//!
//! The types are organized by the RFC that defined them, with the most
//! common types from [RFC 1035] living in [`rfc1035`].
//!
//! The enum [`AllRecordData`] collects all these types plus a variant for
//! data of unknown types that keeps the raw data. It is what records use as
//! their data.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

#[macro_use]
mod macros;

pub mod aaaa;
pub mod dname;
pub mod rfc1035;
pub mod sig;
pub mod tsig;
pub mod unknown;

pub use self::tsig::Time48;
pub use self::unknown::UnknownRecordData;

use crate::base::iana::Rtype;
use crate::base::name::{Compressor, Name};
use crate::base::scan::{ScanError, Scanner, Token};
use crate::base::wire::ParseError;
use bytes::BytesMut;
use core::{cmp, fmt};
use octseq::parse::Parser;

//------------ RecordData ----------------------------------------------------

/// A type that represents record data of a specific record type.
pub trait RecordData: fmt::Display + Sized {
    /// The record type of the data.
    const RTYPE: Rtype;

    /// Parses the record data from wire format.
    ///
    /// The parser covers the entire message and is positioned at the start
    /// of the record data which is `rdlen` octets long.
    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        rdlen: usize,
    ) -> Result<Self, ParseError>;

    /// Scans the record data from its representation format.
    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError>;

    /// Appends the wire format of the record data.
    ///
    /// If a compressor is given, domain names may be compressed. Only the
    /// types defined in RFC 1035 actually do so.
    fn compose_rdata(
        &self,
        target: &mut BytesMut,
        compressor: Option<&mut Compressor>,
    );

    /// Appends the canonical wire format of the record data.
    ///
    /// By default, this is the same as the uncompressed wire format.
    fn compose_canonical_rdata(&self, target: &mut BytesMut) {
        self.compose_rdata(target, None)
    }
}

/// Appends a domain name, compressing it if a compressor is available.
pub(crate) fn compose_name(
    name: &Name,
    target: &mut BytesMut,
    compressor: Option<&mut Compressor>,
) {
    match compressor {
        Some(compressor) => name.compose_compressed(target, compressor),
        None => name.compose(target),
    }
}

//------------ AllRecordData -------------------------------------------------

rdata_types! {
    rfc1035::{A, Ns, Cname, Soa, Ptr, Mx, Txt}
    aaaa::{Aaaa}
    dname::{Dname}
    sig::{Sig, Rrsig}
    tsig::{Tsig}
}

impl AllRecordData {
    /// Returns the canonical ordering of two record data values.
    ///
    /// This is the ordering of the canonical wire format as an octets
    /// sequence as defined in section 6.2 of RFC 4034.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> cmp::Ordering {
        let mut left = BytesMut::new();
        self.compose_canonical_rdata(&mut left);
        let mut right = BytesMut::new();
        other.compose_canonical_rdata(&mut right);
        left[..].cmp(&right[..])
    }

    /// Returns the name additional section processing should look up.
    ///
    /// This is the name server of NS and the exchange of MX records.
    #[must_use]
    pub fn additional_name(&self) -> Option<&Name> {
        match *self {
            AllRecordData::Ns(ref ns) => Some(ns.nsdname()),
            AllRecordData::Mx(ref mx) => Some(mx.exchange()),
            _ => None,
        }
    }

    /// Returns the type covered if this is signature data.
    #[must_use]
    pub fn type_covered(&self) -> Option<Rtype> {
        match *self {
            AllRecordData::Sig(ref sig) => Some(sig.type_covered()),
            AllRecordData::Rrsig(ref sig) => Some(sig.type_covered()),
            _ => None,
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::base::scan::entries;
    use core::str::FromStr;

    /// Composes the data, parses it back, and checks that it is equal.
    ///
    /// Also checks that display output scans back into the same data.
    pub fn check_round_trip(data: &AllRecordData) {
        let mut buf = BytesMut::new();
        data.compose_rdata(&mut buf, None);
        let mut parser = Parser::from_ref(&buf[..]);
        let parsed =
            AllRecordData::parse(data.rtype(), &mut parser, buf.len()).unwrap();
        assert_eq!(&parsed, data);

        let text = data.to_string();
        let res = entries(&text).unwrap();
        let mut scanner = Scanner::new(&res[0].tokens, None);
        let scanned = AllRecordData::scan(data.rtype(), &mut scanner).unwrap();
        scanner.finish().unwrap();
        assert_eq!(&scanned, data);
    }

    pub fn scan(rtype: Rtype, text: &str) -> Result<AllRecordData, ScanError> {
        let res = entries(text)?;
        let mut scanner = Scanner::new(&res[0].tokens, None);
        let data = AllRecordData::scan(rtype, &mut scanner)?;
        scanner.finish()?;
        Ok(data)
    }

    #[test]
    fn generic_form() {
        let data = scan(Rtype::A, "\\# 4 C0000201").unwrap();
        assert_eq!(data, AllRecordData::A(A::from_str("192.0.2.1").unwrap()));

        let data = scan(Rtype::Unknown(731), "\\# 3 abcdef").unwrap();
        assert_eq!(data.to_string(), "\\# 3 ABCDEF");
        check_round_trip(&data);

        assert!(scan(Rtype::A, "\\# 3 C00002").is_err());
        assert!(scan(Rtype::Unknown(731), "foo").is_err());
    }

    #[test]
    fn data_length_checked() {
        let wire = b"\xc0\x00\x02\x01\x00";
        let mut parser = Parser::from_ref(&wire[..]);
        assert!(AllRecordData::parse(Rtype::A, &mut parser, 5).is_err());
        let mut parser = Parser::from_ref(&wire[..]);
        assert_eq!(
            AllRecordData::parse(Rtype::A, &mut parser, 6),
            Err(ParseError::ShortInput)
        );
    }

    #[test]
    fn canonical_order() {
        let a1 = AllRecordData::A(A::from_str("192.0.2.1").unwrap());
        let a2 = AllRecordData::A(A::from_str("192.0.2.10").unwrap());
        assert_eq!(a1.canonical_cmp(&a2), cmp::Ordering::Less);
        let ns1 = scan(Rtype::Ns, "NS1.example.").unwrap();
        let ns2 = scan(Rtype::Ns, "ns1.example.").unwrap();
        assert_eq!(ns1.canonical_cmp(&ns2), cmp::Ordering::Equal);
    }
}
