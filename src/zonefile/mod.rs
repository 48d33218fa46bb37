//! Reading zone files.
//!
//! This module reads the textual representation of zone data known as
//! master files or zone files and defined in section 5 of [RFC 1035].
//!
//! Each entry of the file is either a record or a control directive. The
//! directives `$ORIGIN` and `$TTL` are supported. Since this crate does
//! no I/O, `$INCLUDE` is rejected.
//!
//! An entry starting with whitespace has no owner and uses the owner of the
//! previous record. The owner `@` stands for the current origin and relative
//! names are completed with it. If a record lacks a class, the class of the
//! previous record is used or, for the first record, the default class.
//! If it lacks a TTL, the value of the last `$TTL` directive or the TTL of
//! the previous record is used, whichever came last. A SOA record without
//! any TTL available uses its minimum field.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::scan::{entries, Entry, ScanError, Scanner};
use crate::rdata::AllRecordData;
use std::vec;

//------------ Zonefile ------------------------------------------------------

/// A zone file being read.
///
/// The type is an iterator over the records of the file.
#[derive(Clone, Debug)]
pub struct Zonefile {
    /// The entries of the file not yet processed.
    entries: vec::IntoIter<Entry>,

    /// The current origin.
    origin: Option<Name>,

    /// The class used if the first record doesn’t have one.
    default_class: Class,

    /// The owner of the previous record.
    last_owner: Option<Name>,

    /// The TTL of the previous record or the last `$TTL` directive.
    last_ttl: Option<u32>,

    /// The class of the previous record.
    last_class: Option<Class>,
}

impl Zonefile {
    /// Prepares reading the given text.
    ///
    /// This splits the text into entries, so syntax errors such as
    /// unbalanced parentheses are reported right away.
    pub fn new(text: &str) -> Result<Self, ScanError> {
        Ok(Zonefile {
            entries: entries(text)?.into_iter(),
            origin: None,
            default_class: Class::In,
            last_owner: None,
            last_ttl: None,
            last_class: None,
        })
    }

    /// Sets the initial origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Name) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the class for records before the first explicit class.
    #[must_use]
    pub fn with_default_class(mut self, class: Class) -> Self {
        self.default_class = class;
        self
    }

    /// Returns the current origin.
    #[must_use]
    pub fn origin(&self) -> Option<&Name> {
        self.origin.as_ref()
    }

    /// Returns the next record in the zone file.
    ///
    /// Returns `Ok(None)` if the end of the file has been reached.
    ///
    /// This method is identical to the `next` method of the iterator
    /// implementation but has the return type transposed for easier use
    /// with the question mark operator.
    pub fn next_record(&mut self) -> Result<Option<Record>, ScanError> {
        while let Some(entry) = self.entries.next() {
            let line = entry.line;
            let res = if entry
                .tokens
                .first()
                .map_or(false, |token| token.as_str().starts_with('$'))
                && !entry.blank_owner
            {
                self.scan_control(&entry).map(|_| None)
            } else {
                self.scan_record(&entry).map(Some)
            };
            match res {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => {}
                Err(err) => return Err(err.at_line(line)),
            }
        }
        Ok(None)
    }

    /// Scans a control directive.
    fn scan_control(&mut self, entry: &Entry) -> Result<(), ScanError> {
        let mut scanner = Scanner::new(&entry.tokens, self.origin.as_ref());
        let ctrl = scanner.scan_str()?;
        if ctrl.eq_ignore_ascii_case("$ORIGIN") {
            let origin = scanner.scan_name()?;
            scanner.finish()?;
            self.origin = Some(origin);
            Ok(())
        } else if ctrl.eq_ignore_ascii_case("$TTL") {
            let ttl = scanner.scan_ttl()?;
            scanner.finish()?;
            self.last_ttl = Some(ttl);
            Ok(())
        } else if ctrl.eq_ignore_ascii_case("$INCLUDE") {
            Err(ScanError::custom("$INCLUDE is not supported"))
        } else {
            Err(ScanError::custom(format!("unknown control '{}'", ctrl)))
        }
    }

    /// Scans a record.
    fn scan_record(&mut self, entry: &Entry) -> Result<Record, ScanError> {
        let mut scanner = Scanner::new(&entry.tokens, self.origin.as_ref());
        let owner = if entry.blank_owner {
            self.last_owner
                .clone()
                .ok_or_else(|| ScanError::custom("missing owner"))?
        } else {
            scanner.scan_name()?
        };
        let (ttl, class, rtype) = scanner.scan_record_header()?;
        let data = AllRecordData::scan(rtype, &mut scanner)?;
        scanner.finish()?;

        let class = class
            .or(self.last_class)
            .unwrap_or(self.default_class);
        let ttl = match (ttl.or(self.last_ttl), &data) {
            (Some(ttl), _) => ttl,
            (None, AllRecordData::Soa(soa)) => soa.minimum(),
            (None, _) => return Err(ScanError::custom("missing TTL")),
        };
        self.last_owner = Some(owner.clone());
        self.last_class = Some(class);
        self.last_ttl = Some(ttl);
        Ok(Record::new(owner, class, ttl, data))
    }
}

impl Iterator for Zonefile {
    type Item = Result<Record, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

//------------ read ----------------------------------------------------------

/// Reads all records from zone file text.
///
/// If `origin` is given, it is used as the initial origin.
pub fn read(text: &str, origin: Option<Name>) -> Result<Vec<Record>, ScanError> {
    let mut zonefile = Zonefile::new(text)?;
    if let Some(origin) = origin {
        zonefile = zonefile.with_origin(origin);
    }
    zonefile.collect()
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::Rtype;
    use core::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn defaults_and_directives() {
        let text = "\
$TTL 1h
@   IN SOA ns1 hostmaster ( 2024010101 7200 3600
                            1209600 300 )
    NS ns1
ns1 A 192.0.2.1 ; the name server
www 60 A 192.0.2.2
    AAAA 2001:db8::2
$ORIGIN sub.example.com.
foo CH TXT \"hello world\"
bar A 192.0.2.3
";
        let records = read(text, Some(name("example.com."))).unwrap();
        assert_eq!(records.len(), 7);

        assert_eq!(records[0].owner(), &name("example.com."));
        assert_eq!(records[0].rtype(), Rtype::Soa);
        assert_eq!(records[0].ttl(), 3600);
        assert_eq!(records[1].owner(), &name("example.com."));
        assert_eq!(records[1].rtype(), Rtype::Ns);
        assert_eq!(records[2].owner(), &name("ns1.example.com."));

        // An explicit TTL carries over to the next record.
        assert_eq!(records[3].ttl(), 60);
        assert_eq!(records[4].owner(), &name("www.example.com."));
        assert_eq!(records[4].ttl(), 60);

        assert_eq!(records[5].owner(), &name("foo.sub.example.com."));
        assert_eq!(records[5].class(), Class::Ch);
        // And so does the class.
        assert_eq!(records[6].class(), Class::Ch);
    }

    #[test]
    fn soa_minimum_as_ttl() {
        let records = read(
            "example. SOA ns.example. admin.example. 1 2 3 4 5\n\
             example. NS ns.example.\n",
            None,
        )
        .unwrap();
        assert_eq!(records[0].ttl(), 5);
        assert_eq!(records[1].ttl(), 5);
    }

    #[test]
    fn errors() {
        let err = read("www A 192.0.2.1\n", None).unwrap_err();
        assert_eq!(err.line(), Some(1));
        let err = read("$TTL 1\n\n  A 192.0.2.1\n", None).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(read("$INCLUDE other.zone\n", None).is_err());
        assert!(read("$FOO bar\n", None).is_err());
        assert!(read("example. A 192.0.2.1\n", None).is_err());
    }
}
