//! Resource records with owned, typed data.

use super::iana::{Class, Rtype};
use super::name::{Compressor, Name};
use super::scan::{entries, ScanError, Scanner};
use super::wire::{compose_len_prefixed, ComposeError, Parse, ParseError};
use crate::rdata::AllRecordData;
use bytes::{BufMut, BytesMut};
use core::cmp::Ordering;
use core::str::FromStr;
use core::fmt;
use core::hash;
use octseq::parse::Parser;

//------------ Record --------------------------------------------------------

/// A resource record.
///
/// The record type isn’t stored separately; it follows from the variant of
/// [`AllRecordData`].
///
/// Two records compare equal if they have the same owner, class, and data.
/// The TTL is not considered. Ordering follows the canonical order of
/// RFC 4034, section 6.3.
#[derive(Clone)]
pub struct Record {
    owner: Name,
    class: Class,
    ttl: u32,
    data: AllRecordData,
}

impl Record {
    #[must_use]
    pub fn new(owner: Name, class: Class, ttl: u32, data: AllRecordData) -> Self {
        Record {
            owner,
            class,
            ttl,
            data,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    #[must_use]
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// The RRset key: the covered type for signatures, else the record type.
    #[must_use]
    pub fn rrset_type(&self) -> Rtype {
        self.data.type_covered().unwrap_or_else(|| self.rtype())
    }

    /// Returns whether this is a SIG or RRSIG record.
    #[must_use]
    pub fn is_signature(&self) -> bool {
        self.rtype().is_signature()
    }

    #[must_use]
    pub fn class(&self) -> Class {
        self.class
    }

    #[must_use]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl
    }

    #[must_use]
    pub fn data(&self) -> &AllRecordData {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> AllRecordData {
        self.data
    }

    /// Used for records synthesized from a wildcard.
    #[must_use]
    pub fn with_owner(&self, owner: Name) -> Self {
        Record {
            owner,
            class: self.class,
            ttl: self.ttl,
            data: self.data.clone(),
        }
    }

    /// Returns whether the two records belong to the same RRset.
    #[must_use]
    pub fn same_rrset(&self, other: &Record) -> bool {
        self.owner == other.owner
            && self.rrset_type() == other.rrset_type()
            && self.class == other.class
    }
}

impl Record {
    /// Appends the wire format of the record.
    ///
    /// If a compressor is given, the owner is compressed and so are the
    /// domain names in the record data where that is allowed.
    pub fn compose(
        &self,
        target: &mut BytesMut,
        compressor: Option<&mut Compressor>,
    ) -> Result<(), ComposeError> {
        let start = target.len();
        let compressor = match compressor {
            Some(compressor) => {
                self.owner.compose_compressed(target, compressor);
                Some(compressor)
            }
            None => {
                self.owner.compose(target);
                None
            }
        };
        self.compose_head(target);
        compose_len_prefixed(target, |target| {
            self.data.compose_rdata(target, compressor);
            Ok(())
        })
        .map_err(|err| {
            target.truncate(start);
            err
        })
    }

    /// Appends the canonical wire format of the record.
    ///
    /// This lowercases and never compresses all domain names.
    pub fn compose_canonical(
        &self,
        target: &mut BytesMut,
    ) -> Result<(), ComposeError> {
        let start = target.len();
        self.owner.compose_canonical(target);
        self.compose_head(target);
        compose_len_prefixed(target, |target| {
            self.data.compose_canonical_rdata(target);
            Ok(())
        })
        .map_err(|err| {
            target.truncate(start);
            err
        })
    }

    fn compose_head(&self, target: &mut BytesMut) {
        target.put_u16(self.rtype().to_int());
        target.put_u16(self.class.to_int());
        target.put_u32(self.ttl);
    }
}

impl Parse for Record {
    fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        let owner = Name::parse(parser)?;
        let rtype = Rtype::from_int(parser.parse_u16_be()?);
        let class = Class::from_int(parser.parse_u16_be()?);
        let ttl = parser.parse_u32_be()?;
        let rdlen = usize::from(parser.parse_u16_be()?);
        let data = AllRecordData::parse(rtype, parser, rdlen)?;
        Ok(Record::new(owner, class, ttl, data))
    }
}

impl Record {
    /// Scans everything after the owner of a record’s text form.
    ///
    /// TTL and class are optional and taken from the defaults if missing.
    /// All tokens of the scanner must be consumed.
    pub fn scan_after_owner(
        owner: Name,
        scanner: &mut Scanner,
        default_ttl: u32,
        default_class: Class,
    ) -> Result<Self, ScanError> {
        let (ttl, class, rtype) = scanner.scan_record_header()?;
        let data = AllRecordData::scan(rtype, scanner)?;
        scanner.finish()?;
        Ok(Record::new(
            owner,
            class.unwrap_or(default_class),
            ttl.unwrap_or(default_ttl),
            data,
        ))
    }
}

impl FromStr for Record {
    type Err = ScanError;

    /// Scans a record from a single line in representation format.
    ///
    /// The owner must be absolute. A missing TTL defaults to zero and a
    /// missing class to IN.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = entries(s)?;
        let entry = match entries.as_slice() {
            [entry] if !entry.blank_owner => entry,
            _ => return Err(ScanError::custom("expected a single record")),
        };
        let mut scanner = Scanner::new(&entry.tokens, None);
        let owner = scanner.scan_name()?;
        Self::scan_after_owner(owner, &mut scanner, 0, Class::In)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.class == other.class
            && self.data == other.data
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.owner
            .cmp(&other.owner)
            .then_with(|| self.class.cmp(&other.class))
            .then_with(|| self.rtype().cmp(&other.rtype()))
            .then_with(|| self.data.canonical_cmp(&other.data))
    }
}

impl hash::Hash for Record {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        hash::Hash::hash(&self.owner, state);
        hash::Hash::hash(&self.class, state);
        hash::Hash::hash(&self.rtype(), state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner,
            self.ttl,
            self.class,
            self.rtype(),
            self.data
        )
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Record")
            .field("owner", &self.owner)
            .field("class", &self.class)
            .field("ttl", &self.ttl)
            .field("data", &self.data)
            .finish()
    }
}

//============ Testing ======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(record: &Record) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn eq_and_hash_ignore_ttl_and_case() {
        let left = Record::from_str("www.example.com. 60 A 192.0.2.1").unwrap();
        let right =
            Record::from_str("WWW.Example.COM. 3600 A 192.0.2.1").unwrap();
        assert_eq!(left, right);
        assert_eq!(hash_of(&left), hash_of(&right));
    }

    #[test]
    fn from_str() {
        let record =
            Record::from_str("www.example.com. 3600 IN A 192.0.2.1").unwrap();
        assert_eq!(record.owner().to_string(), "www.example.com.");
        assert_eq!(record.ttl(), 3600);
        assert_eq!(record.class(), Class::In);
        assert_eq!(record.rtype(), Rtype::A);

        let record = Record::from_str("example.com. CH 1h TXT foo").unwrap();
        assert_eq!(record.ttl(), 3600);
        assert_eq!(record.class(), Class::Ch);

        let record = Record::from_str("example.com. MX 10 mail.example.com.")
            .unwrap();
        assert_eq!(record.ttl(), 0);
        assert_eq!(record.class(), Class::In);

        assert!(Record::from_str("www A 192.0.2.1").is_err());
        assert!(Record::from_str("www.example. A 192.0.2.1 extra").is_err());
    }

    #[test]
    fn eq_ignores_ttl() {
        let one = Record::from_str("www.example. 10 A 192.0.2.1").unwrap();
        let two = Record::from_str("WWW.example. 20 A 192.0.2.1").unwrap();
        let three = Record::from_str("www.example. 10 A 192.0.2.2").unwrap();
        assert_eq!(one, two);
        assert_ne!(one, three);
        assert!(one < three);
    }

    #[test]
    fn rrset_type_of_signature() {
        let sig = Record::from_str(
            "example. RRSIG MX 13 1 3600 20240201000000 20240101000000 \
             1 example. AAAA",
        )
        .unwrap();
        assert_eq!(sig.rtype(), Rtype::Rrsig);
        assert_eq!(sig.rrset_type(), Rtype::Mx);
        assert!(sig.is_signature());
        let mx = Record::from_str("example. MX 10 mx.example.").unwrap();
        assert!(sig.same_rrset(&mx));
    }

    #[test]
    fn compose_and_parse() {
        let record =
            Record::from_str("www.example.com. 3600 IN CNAME example.com.")
                .unwrap();
        let mut compressor = Compressor::new();
        let mut buf = BytesMut::new();
        record.compose(&mut buf, Some(&mut compressor)).unwrap();
        // Owner, header, and a pointer to “example.com.”.
        assert_eq!(buf.len(), 17 + 10 + 2);
        let mut parser = Parser::from_ref(&buf[..]);
        let parsed = Record::parse(&mut parser).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.ttl(), 3600);
        assert_eq!(parser.remaining(), 0);

        let mut canonical = BytesMut::new();
        record.compose_canonical(&mut canonical).unwrap();
        assert_eq!(canonical.len(), 17 + 10 + 13);
    }
}
