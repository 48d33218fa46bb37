//! The outcome of a zone lookup.

use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::rrset::Rrset;
use crate::rdata::AllRecordData;
use core::fmt;

//------------ SetResponse ---------------------------------------------------

/// The result of looking up a name and record type in a zone.
///
/// The negative variants carry the zone’s SOA RRset if the zone is
/// authoritative for the name that was looked up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SetResponse {
    /// Nothing is known about the name.
    Unknown,

    /// The name does not exist.
    NxDomain { soa: Option<Rrset> },

    /// The name exists but has no records of the requested type.
    NxRrset { soa: Option<Rrset> },

    /// The name is below a zone cut.
    ///
    /// The value is the NS RRset of the cut.
    Delegation(Rrset),

    /// The name is an alias.
    ///
    /// The lookup needs to continue with the target of the record.
    Cname(Record),

    /// The name is below a DNAME redirection.
    Dname(Record),

    /// The RRsets found for the name.
    Successful(Vec<Rrset>),
}

impl SetResponse {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(*self, SetResponse::Unknown)
    }

    #[must_use]
    pub fn is_nxdomain(&self) -> bool {
        matches!(*self, SetResponse::NxDomain { .. })
    }

    #[must_use]
    pub fn is_nxrrset(&self) -> bool {
        matches!(*self, SetResponse::NxRrset { .. })
    }

    #[must_use]
    pub fn is_delegation(&self) -> bool {
        matches!(*self, SetResponse::Delegation(_))
    }

    #[must_use]
    pub fn is_cname(&self) -> bool {
        matches!(*self, SetResponse::Cname(_))
    }

    #[must_use]
    pub fn is_dname(&self) -> bool {
        matches!(*self, SetResponse::Dname(_))
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(*self, SetResponse::Successful(_))
    }

    /// Returns the RRsets of a successful lookup.
    ///
    /// Returns an empty slice for all other outcomes.
    #[must_use]
    pub fn answers(&self) -> &[Rrset] {
        match *self {
            SetResponse::Successful(ref rrsets) => rrsets,
            _ => &[],
        }
    }

    /// Returns the SOA RRset attached to a negative response.
    #[must_use]
    pub fn soa(&self) -> Option<&Rrset> {
        match *self {
            SetResponse::NxDomain { ref soa }
            | SetResponse::NxRrset { ref soa } => soa.as_ref(),
            _ => None,
        }
    }

    /// Returns the NS RRset of a delegation.
    #[must_use]
    pub fn ns(&self) -> Option<&Rrset> {
        match *self {
            SetResponse::Delegation(ref ns) => Some(ns),
            _ => None,
        }
    }

    /// Returns the target of a CNAME response.
    #[must_use]
    pub fn cname_target(&self) -> Option<&Name> {
        match *self {
            SetResponse::Cname(ref record) => match *record.data() {
                AllRecordData::Cname(ref cname) => Some(cname.cname()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the target of a DNAME response.
    #[must_use]
    pub fn dname_target(&self) -> Option<&Name> {
        match *self {
            SetResponse::Dname(ref record) => match *record.data() {
                AllRecordData::Dname(ref dname) => Some(dname.dname()),
                _ => None,
            },
            _ => None,
        }
    }
}

//--- Display

impl fmt::Display for SetResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SetResponse::Unknown => f.write_str("unknown"),
            SetResponse::NxDomain { .. } => f.write_str("NXDOMAIN"),
            SetResponse::NxRrset { .. } => f.write_str("NXRRSET"),
            SetResponse::Delegation(ref ns) => {
                write!(f, "delegation: {}", ns.name())
            }
            SetResponse::Cname(ref record) => {
                write!(f, "CNAME: {}", record)
            }
            SetResponse::Dname(ref record) => {
                write!(f, "DNAME: {}", record)
            }
            SetResponse::Successful(ref rrsets) => {
                write!(f, "successful: {} RRsets", rrsets.len())
            }
        }
    }
}
