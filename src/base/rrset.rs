//! Record sets.
//!
//! An RRset is the set of all records with the same owner name, record
//! type, and class. The signature records covering the set travel with it
//! but are kept apart from the records themselves.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::record::Record;
use core::fmt;

//------------ Rrset ---------------------------------------------------------

/// A set of records sharing owner, type, and class plus their signatures.
///
/// All records in the set share the same TTL. When a record with a
/// different TTL is added, the smaller of the two is used for all
/// records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rrset {
    name: Name,
    rtype: Rtype,
    class: Class,
    records: Vec<Record>,
    sigs: Vec<Record>,
}

impl Rrset {
    /// Creates a new empty RRset.
    #[must_use]
    pub fn new(name: Name, rtype: Rtype, class: Class) -> Self {
        Rrset {
            name,
            rtype,
            class,
            records: Vec::new(),
            sigs: Vec::new(),
        }
    }

    /// Creates a new RRset from its first record.
    ///
    /// If the record is a signature, the set will be for the type it covers.
    #[must_use]
    pub fn from_record(record: Record) -> Self {
        let mut res = Self::new(
            record.owner().clone(),
            record.rrset_type(),
            record.class(),
        );
        res.add(record);
        res
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    #[must_use]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the TTL of the set.
    ///
    /// If the set only contains signatures, this is their TTL. An empty
    /// set has a TTL of zero.
    #[must_use]
    pub fn ttl(&self) -> u32 {
        self.records
            .first()
            .or_else(|| self.sigs.first())
            .map_or(0, Record::ttl)
    }

    /// Returns the records of the set.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the signature records covering the set.
    #[must_use]
    pub fn sigs(&self) -> &[Record] {
        &self.sigs
    }

    /// Returns an iterator over the records followed by the signatures.
    pub fn iter_all(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().chain(self.sigs.iter())
    }

    /// Returns the number of records in the set, excluding signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the set contains neither records nor signatures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.sigs.is_empty()
    }

    /// Returns whether the record belongs into this set.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        *record.owner() == self.name
            && record.rrset_type() == self.rtype
            && record.class() == self.class
    }

    /// Adds a record to the set.
    ///
    /// Returns `false` if the record doesn’t belong into the set or if it
    /// already is present.
    pub fn add(&mut self, mut record: Record) -> bool {
        if !self.matches(&record) {
            return false;
        }
        let target = if record.is_signature() {
            &mut self.sigs
        } else {
            &mut self.records
        };
        if target.contains(&record) {
            return false;
        }
        if let Some(first) = target.first() {
            let ttl = first.ttl();
            if record.ttl() < ttl {
                target.iter_mut().for_each(|r| r.set_ttl(record.ttl()));
            } else {
                record.set_ttl(ttl);
            }
        }
        target.push(record);
        true
    }

    /// Removes a record from the set.
    ///
    /// Returns whether the record was present.
    pub fn delete(&mut self, record: &Record) -> bool {
        let target = if record.is_signature() {
            &mut self.sigs
        } else {
            &mut self.records
        };
        match target.iter().position(|item| item == record) {
            Some(idx) => {
                target.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the set with all records moved to a new owner.
    ///
    /// This is used when synthesizing an answer from a wildcard.
    #[must_use]
    pub fn with_owner(&self, name: &Name) -> Self {
        Rrset {
            name: name.clone(),
            rtype: self.rtype,
            class: self.class,
            records: self
                .records
                .iter()
                .map(|r| r.with_owner(name.clone()))
                .collect(),
            sigs: self
                .sigs
                .iter()
                .map(|r| r.with_owner(name.clone()))
                .collect(),
        }
    }
}

//--- Display

impl fmt::Display for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for record in self.iter_all() {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================
