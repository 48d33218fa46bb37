//! Authoritative zones.
//!
//! A [`Zone`] holds all the records of a zone in memory and answers
//! lookups for a name and record type with a [`SetResponse`] describing
//! the outcome.
//!
//! The zone is safe to share between threads. All operations take a single
//! lock covering the whole zone. Lookups take it for reading, so they can
//! happen in parallel, while adding and removing records takes it for
//! writing.
//!
//! # Lookup
//!
//! The lookup walks from the origin of the zone towards the queried name
//! one label at a time. Below the apex, a node with an NS RRset is a zone
//! cut and ends the walk with a delegation. A node above the queried name
//! with a DNAME record ends it with the DNAME. At the queried name itself,
//! the RRset of the requested type is returned or, failing that, a CNAME
//! record. If the name does not exist, wildcard names are tried starting
//! with the most specific one, skipping any wildcard that lacks the
//! requested type. Records synthesized from a wildcard carry the queried
//! name as their owner. A name that only exists because there are names
//! below it yields NXRRSET if no wildcard answered.

pub use self::set::SetResponse;

use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::rrset::Rrset;
use crate::base::scan::ScanError;
use crate::rdata::{AllRecordData, Soa};
use crate::zonefile;
use core::fmt;
use core::ops::Bound;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::vec;
use tracing::trace;

mod set;

/// The RRsets at a single name.
type Node = SmallVec<[Rrset; 4]>;

//------------ Zone ----------------------------------------------------------

/// An authoritative zone.
pub struct Zone {
    inner: RwLock<ZoneInner>,
}

/// # Creation
///
impl Zone {
    /// Creates a zone from its records.
    ///
    /// The origin must be absolute. Exactly one SOA record and at least one
    /// NS record must be present at the origin. The class of the zone is
    /// the class of the SOA record and all records must be of that class
    /// and at or below the origin.
    pub fn new(
        origin: Name,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, ZoneError> {
        if !origin.is_absolute() {
            return Err(ZoneError::RelativeOrigin);
        }
        let records: Vec<_> = records.into_iter().collect();
        let mut soas = records
            .iter()
            .filter(|r| r.rtype() == Rtype::Soa && *r.owner() == origin);
        let class = match (soas.next(), soas.next()) {
            (Some(soa), None) => soa.class(),
            (None, _) => return Err(ZoneError::MissingSoa),
            (Some(_), Some(_)) => return Err(ZoneError::MultipleSoa),
        };

        let mut inner = ZoneInner {
            origin,
            class,
            nodes: BTreeMap::new(),
            has_wildcard: false,
        };
        for record in records {
            inner.add(record)?;
        }
        if inner.rrset(&inner.origin, Rtype::Ns).is_none() {
            return Err(ZoneError::MissingNs);
        }
        trace!(origin = %inner.origin, names = inner.nodes.len(), "zone created");
        Ok(Zone {
            inner: RwLock::new(inner),
        })
    }

    /// Creates a zone from the text of a zone file.
    ///
    /// The `origin` is used as the initial origin of the file.
    pub fn from_zonefile(origin: Name, text: &str) -> Result<Self, ZoneError> {
        let records = zonefile::read(text, Some(origin.clone()))?;
        Self::new(origin, records)
    }
}

/// # Access to Properties
///
impl Zone {
    /// Returns the origin of the zone.
    #[must_use]
    pub fn origin(&self) -> Name {
        self.inner.read().origin.clone()
    }

    #[must_use]
    pub fn class(&self) -> Class {
        self.inner.read().class
    }

    /// Returns the SOA RRset of the zone.
    ///
    /// This is `None` only if the SOA record has been removed.
    #[must_use]
    pub fn soa(&self) -> Option<Rrset> {
        self.inner.read().soa()
    }

    /// Returns the NS RRset at the apex of the zone.
    #[must_use]
    pub fn ns(&self) -> Option<Rrset> {
        let inner = self.inner.read();
        inner.rrset(&inner.origin, Rtype::Ns).cloned()
    }

    /// Returns the serial number from the SOA record.
    #[must_use]
    pub fn serial(&self) -> Option<u32> {
        self.inner.read().soa_record().map(|soa| soa.serial())
    }

    /// Returns whether the zone contains a wildcard name.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.inner.read().has_wildcard
    }

    /// Returns whether the zone is authoritative for a name.
    ///
    /// This is the case if the name is at or below the origin. Zone cuts
    /// are not considered.
    #[must_use]
    pub fn contains(&self, name: &Name) -> bool {
        name.is_subdomain(&self.inner.read().origin)
    }
}

/// # Lookups
///
impl Zone {
    /// Looks up the records for a name and type.
    ///
    /// SIG and RRSIG lookups are treated as ANY lookups. The caller picks
    /// the signatures out of the returned RRsets.
    #[must_use]
    pub fn find_records(&self, name: &Name, rtype: Rtype) -> SetResponse {
        let res = self.inner.read().lookup(name, rtype);
        trace!(%name, %rtype, response = %res, "zone lookup");
        res
    }

    /// Returns the RRset of the given type stored exactly at a name.
    ///
    /// This ignores zone cuts and CNAME records, so it is suitable for
    /// looking up glue.
    #[must_use]
    pub fn find_exact(&self, name: &Name, rtype: Rtype) -> Option<Rrset> {
        self.inner.read().rrset(name, rtype).cloned()
    }

    /// Returns all RRsets of the zone.
    ///
    /// The SOA RRset comes first, all others follow in canonical order of
    /// their owner names.
    #[must_use]
    pub fn iter(&self) -> vec::IntoIter<Rrset> {
        self.inner.read().rrsets().into_iter()
    }

    /// Returns all RRsets of the zone for a zone transfer.
    ///
    /// This is the same as [`iter`][Self::iter] but the SOA RRset is
    /// repeated at the end.
    #[must_use]
    pub fn axfr_iter(&self) -> vec::IntoIter<Rrset> {
        let inner = self.inner.read();
        let mut res = inner.rrsets();
        if let Some(soa) = inner.soa() {
            res.push(soa)
        }
        res.into_iter()
    }
}

/// # Changing Records
///
impl Zone {
    /// Adds a record to the zone.
    ///
    /// Adding a SOA record at the origin replaces the current SOA record.
    pub fn add_record(&self, record: Record) -> Result<(), ZoneError> {
        trace!(%record, "adding record");
        self.inner.write().add(record)
    }

    /// Removes a record from the zone.
    ///
    /// Returns whether the record was present.
    pub fn remove_record(&self, record: &Record) -> bool {
        trace!(%record, "removing record");
        self.inner.write().remove(record)
    }
}

//--- Display

impl fmt::Display for Zone {
    /// Formats the zone as zone file text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.read();
        writeln!(f, "$ORIGIN {}", inner.origin)?;
        for rrset in inner.rrsets() {
            fmt::Display::fmt(&rrset, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Zone")
            .field("origin", &inner.origin)
            .field("class", &inner.class)
            .field("names", &inner.nodes.len())
            .finish()
    }
}

//------------ ZoneInner -----------------------------------------------------

/// The data of a zone protected by the lock.
struct ZoneInner {
    origin: Name,
    class: Class,
    nodes: BTreeMap<Name, Node>,

    /// Whether any owner name starts with the wildcard label.
    has_wildcard: bool,
}

impl ZoneInner {
    fn rrset(&self, name: &Name, rtype: Rtype) -> Option<&Rrset> {
        self.nodes
            .get(name)
            .and_then(|node| node.iter().find(|set| set.rtype() == rtype))
    }

    fn soa(&self) -> Option<Rrset> {
        self.rrset(&self.origin, Rtype::Soa).cloned()
    }

    fn soa_record(&self) -> Option<&Soa> {
        let set = self.rrset(&self.origin, Rtype::Soa)?;
        match *set.records().first()?.data() {
            AllRecordData::Soa(ref soa) => Some(soa),
            _ => None,
        }
    }

    /// Returns all RRsets with the SOA first.
    fn rrsets(&self) -> Vec<Rrset> {
        let mut res: Vec<_> = self.soa().into_iter().collect();
        for (name, node) in &self.nodes {
            let apex = *name == self.origin;
            res.extend(
                node.iter()
                    .filter(|set| !(apex && set.rtype() == Rtype::Soa))
                    .cloned(),
            );
        }
        res
    }

    fn add(&mut self, record: Record) -> Result<(), ZoneError> {
        if !record.owner().is_subdomain(&self.origin) {
            return Err(ZoneError::OutOfZone(record.owner().clone()));
        }
        if record.class() != self.class {
            return Err(ZoneError::ClassMismatch(record.class()));
        }
        if record.owner().is_wildcard() {
            self.has_wildcard = true;
        }
        let replace = record.rtype() == Rtype::Soa;
        let rtype = record.rrset_type();
        let node = self.nodes.entry(record.owner().clone()).or_default();
        match node.iter_mut().find(|set| set.rtype() == rtype) {
            Some(set) if replace => *set = Rrset::from_record(record),
            Some(set) => {
                set.add(record);
            }
            None => node.push(Rrset::from_record(record)),
        }
        Ok(())
    }

    fn remove(&mut self, record: &Record) -> bool {
        let owner = record.owner();
        let rtype = record.rrset_type();
        let (removed, node_empty) = match self.nodes.get_mut(owner) {
            Some(node) => {
                let idx = match node.iter().position(|set| set.rtype() == rtype)
                {
                    Some(idx) => idx,
                    None => return false,
                };
                let removed = node[idx].delete(record);
                if node[idx].is_empty() {
                    node.remove(idx);
                }
                (removed, node.is_empty())
            }
            None => return false,
        };
        if node_empty {
            self.nodes.remove(owner);
            if owner.is_wildcard() {
                self.has_wildcard = self.nodes.keys().any(Name::is_wildcard);
            }
        }
        removed
    }

    /// Returns whether there are names below `name`.
    ///
    /// In canonical order, all names below a name directly follow it.
    fn has_descendants(&self, name: &Name) -> bool {
        self.nodes
            .range((Bound::Excluded(name), Bound::Unbounded))
            .next()
            .map_or(false, |(next, _)| next.is_subdomain(name))
    }

    fn lookup(&self, name: &Name, rtype: Rtype) -> SetResponse {
        if !name.is_subdomain(&self.origin) {
            return SetResponse::NxDomain { soa: None };
        }
        let any = rtype == Rtype::Any || rtype.is_signature();
        let labels = name.label_count();
        let origin_labels = self.origin.label_count();

        for depth in origin_labels..=labels {
            let is_origin = depth == origin_labels;
            let is_exact = depth == labels;
            let current = if is_exact {
                name.clone()
            } else if is_origin {
                self.origin.clone()
            } else {
                match name.strip_labels(labels - depth) {
                    Some(current) => current,
                    None => break,
                }
            };
            let node = match self.nodes.get(&current) {
                Some(node) => node,
                None => continue,
            };

            // The NS RRset at the apex is the zone’s own.
            if !is_origin {
                if let Some(ns) = find(node, Rtype::Ns) {
                    return SetResponse::Delegation(ns.clone());
                }
            }
            if is_exact {
                return self.answer_node(node, rtype, any);
            }
            if let Some(dname) = find(node, Rtype::Dname) {
                if let Some(record) = dname.records().first() {
                    return SetResponse::Dname(record.clone());
                }
            }
        }

        if self.has_wildcard {
            if let Some(res) = self.wildcard_answer(name, rtype, any) {
                return res;
            }
        }

        // An empty non-terminal exists but has no records.
        if self.has_descendants(name) {
            return SetResponse::NxRrset { soa: self.soa() };
        }
        SetResponse::NxDomain { soa: self.soa() }
    }

    /// Produces the answer from the node of the queried name.
    fn answer_node(&self, node: &Node, rtype: Rtype, any: bool) -> SetResponse {
        if any {
            if node.is_empty() {
                return SetResponse::NxRrset { soa: self.soa() };
            }
            return SetResponse::Successful(node.to_vec());
        }
        if let Some(set) = find(node, rtype) {
            return SetResponse::Successful(vec![set.clone()]);
        }
        if let Some(cname) = find(node, Rtype::Cname) {
            if let Some(record) = cname.records().first() {
                return SetResponse::Cname(record.clone());
            }
        }
        SetResponse::NxRrset { soa: self.soa() }
    }

    /// Synthesizes an answer from the closest wildcard holding `rtype`.
    ///
    /// Wildcards are tried from the most specific suffix up to the apex.
    /// A wildcard without matching data is skipped. The records are moved
    /// to `name`.
    fn wildcard_answer(
        &self,
        name: &Name,
        rtype: Rtype,
        any: bool,
    ) -> Option<SetResponse> {
        let strip = name.label_count() - self.origin.label_count();
        for wild in (1..=strip).filter_map(|n| name.wildcard(n)) {
            let node = match self.nodes.get(&wild) {
                Some(node) => node,
                None => continue,
            };
            let sets: Vec<_> = if any {
                node.iter().map(|set| set.with_owner(name)).collect()
            } else {
                find(node, rtype)
                    .map(|set| set.with_owner(name))
                    .into_iter()
                    .collect()
            };
            if !sets.is_empty() {
                trace!("{} {} answered from {}", name, rtype, wild);
                return Some(SetResponse::Successful(sets));
            }
        }
        None
    }
}

fn find(node: &Node, rtype: Rtype) -> Option<&Rrset> {
    node.iter().find(|set| set.rtype() == rtype)
}

//============ Error Types ===================================================

//------------ ZoneError -----------------------------------------------------

/// A zone could not be created or changed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ZoneError {
    /// The origin of the zone is not absolute.
    RelativeOrigin,

    /// A record’s owner is not at or below the origin.
    OutOfZone(Name),

    /// A record’s class differs from the zone’s class.
    ClassMismatch(Class),

    /// There is no SOA record at the origin.
    MissingSoa,

    /// There is more than one SOA record at the origin.
    MultipleSoa,

    /// There is no NS record at the origin.
    MissingNs,

    /// Reading the zone file failed.
    Zonefile(ScanError),
}

impl From<ScanError> for ZoneError {
    fn from(err: ScanError) -> Self {
        ZoneError::Zonefile(err)
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ZoneError::RelativeOrigin => f.write_str("relative zone origin"),
            ZoneError::OutOfZone(ref name) => {
                write!(f, "name {} is out of zone", name)
            }
            ZoneError::ClassMismatch(class) => {
                write!(f, "record of class {} does not match zone", class)
            }
            ZoneError::MissingSoa => f.write_str("missing SOA record"),
            ZoneError::MultipleSoa => f.write_str("multiple SOA records"),
            ZoneError::MissingNs => f.write_str("missing NS records"),
            ZoneError::Zonefile(ref err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ZoneError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    const ZONE: &str = "\
$TTL 3600
@       SOA ns1 hostmaster 1 7200 3600 1209600 300
        NS ns1
ns1     A 192.0.2.53
www     A 192.0.2.1
a.b.c   A 192.0.2.2
alias   CNAME www
";

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn zone() -> Zone {
        Zone::from_zonefile(name("example.com."), ZONE).unwrap()
    }

    #[test]
    fn construction_errors() {
        let origin = name("example.com.");
        assert_eq!(
            Zone::from_zonefile(origin.clone(), "www 1 A 192.0.2.1\n")
                .unwrap_err(),
            ZoneError::MissingSoa
        );
        assert_eq!(
            Zone::from_zonefile(
                origin.clone(),
                "@ 1 SOA ns1 host 1 2 3 4 5\n"
            )
            .unwrap_err(),
            ZoneError::MissingNs
        );
        assert_eq!(
            Zone::from_zonefile(
                origin.clone(),
                "@ 1 SOA ns1 host 1 2 3 4 5\n@ SOA ns2 host 1 2 3 4 5\n"
            )
            .unwrap_err(),
            ZoneError::MultipleSoa
        );
        assert!(matches!(
            Zone::from_zonefile(
                origin,
                "@ 1 SOA ns1 host 1 2 3 4 5\n@ NS ns1\nfoo.org. A 192.0.2.1\n"
            )
            .unwrap_err(),
            ZoneError::OutOfZone(_)
        ));
        assert_eq!(
            Zone::new(name("example"), Vec::new()).unwrap_err(),
            ZoneError::RelativeOrigin
        );
    }

    #[test]
    fn empty_non_terminal() {
        let zone = zone();
        assert!(zone
            .find_records(&name("b.c.example.com."), Rtype::A)
            .is_nxrrset());
        assert!(zone
            .find_records(&name("x.c.example.com."), Rtype::A)
            .is_nxdomain());
    }

    #[test]
    fn cname_and_any() {
        let zone = zone();
        let res = zone.find_records(&name("alias.example.com."), Rtype::A);
        assert_eq!(res.cname_target(), Some(&name("www.example.com.")));
        // Asking for the CNAME itself returns it as data.
        assert!(zone
            .find_records(&name("alias.example.com."), Rtype::Cname)
            .is_successful());
        let res = zone.find_records(&name("example.com."), Rtype::Any);
        assert_eq!(res.answers().len(), 2);
    }

    #[test]
    fn out_of_zone() {
        let res = zone().find_records(&name("example.org."), Rtype::A);
        assert_eq!(res, SetResponse::NxDomain { soa: None });
    }

    #[test]
    fn add_and_remove() {
        let zone = zone();
        let record = Record::from_str("new.example.com. 60 A 192.0.2.9").unwrap();
        zone.add_record(record.clone()).unwrap();
        assert!(zone
            .find_records(&name("new.example.com."), Rtype::A)
            .is_successful());
        assert!(zone.remove_record(&record));
        assert!(!zone.remove_record(&record));
        assert!(zone
            .find_records(&name("new.example.com."), Rtype::A)
            .is_nxdomain());

        assert!(matches!(
            zone.add_record(Record::from_str("www.example.org. A 192.0.2.1").unwrap()),
            Err(ZoneError::OutOfZone(_))
        ));
        assert_eq!(
            zone.add_record(
                Record::from_str("www.example.com. CH A 192.0.2.1").unwrap()
            ),
            Err(ZoneError::ClassMismatch(Class::Ch))
        );

        zone.add_record(
            Record::from_str(
                "example.com. 3600 SOA ns1.example.com. \
                 hostmaster.example.com. 2 7200 3600 1209600 300",
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(zone.serial(), Some(2));
        assert_eq!(zone.soa().unwrap().len(), 1);
    }

    #[test]
    fn display_round_trip() {
        let zone = zone();
        let text = zone.to_string();
        assert!(text.starts_with("$ORIGIN example.com.\nexample.com.\t3600\tIN\tSOA"));
        let again = Zone::from_zonefile(name("example.com."), &text).unwrap();
        assert_eq!(again.iter().count(), zone.iter().count());
        assert_eq!(again.serial(), Some(1));
    }
}
