//! Answering queries from zones.
//!
//! A [`Responder`] combines a set of authoritative zones and TSIG keys. It
//! takes the octets of a received query and produces the octets of the
//! response messages. There usually is exactly one response. A zone
//! transfer produces a sequence of them and an unusable query none at all.
//!
//! The responder performs no I/O. Over TCP, each returned message needs to
//! be framed via [`base::stream::frame`][crate::base::stream::frame].

use crate::base::header::{HeaderSection, Section};
use crate::base::iana::{Class, Opcode, Rcode, Rtype, TsigRcode};
use crate::base::message::Message;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::rrset::Rrset;
use crate::rdata::{AllRecordData, Cname, Time48, Tsig};
use crate::tsig::{Key, StreamSigner};
use crate::zone::{SetResponse, Zone};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, trace, warn};

//------------ Responder -----------------------------------------------------

/// Produces responses to queries from a set of zones.
#[derive(Clone, Debug)]
pub struct Responder {
    zones: Vec<Arc<Zone>>,
    keys: Vec<Key>,

    /// The maximum number of CNAME and DNAME records to follow.
    max_chain: usize,

    /// The maximum size of a response sent over UDP.
    udp_payload: usize,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new()
    }
}

/// # Configuration
///
impl Responder {
    /// The default for the number of aliases followed.
    pub const DEFAULT_MAX_CHAIN: usize = 6;

    /// The default size limit for UDP responses.
    pub const DEFAULT_UDP_PAYLOAD: usize = 512;

    /// Creates a responder without any zones or keys.
    #[must_use]
    pub fn new() -> Self {
        Responder {
            zones: Vec::new(),
            keys: Vec::new(),
            max_chain: Self::DEFAULT_MAX_CHAIN,
            udp_payload: Self::DEFAULT_UDP_PAYLOAD,
        }
    }

    /// Adds a zone to answer from.
    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<Arc<Zone>>) -> Self {
        self.zones.push(zone.into());
        self
    }

    /// Adds a key for signed queries.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Sets the number of CNAME and DNAME records followed in an answer.
    #[must_use]
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    /// Sets the size limit for responses sent over UDP.
    #[must_use]
    pub fn with_udp_payload(mut self, udp_payload: usize) -> Self {
        self.udp_payload = udp_payload;
        self
    }

    /// Returns the zone most specific for a name.
    #[must_use]
    pub fn find_zone(&self, name: &Name) -> Option<&Arc<Zone>> {
        self.zones
            .iter()
            .filter(|zone| zone.contains(name))
            .max_by_key(|zone| zone.origin().label_count())
    }

    /// Returns the key with the given name.
    fn find_key(&self, name: &Name) -> Option<&Key> {
        self.keys.iter().find(|key| key.name() == name)
    }
}

/// # Processing Queries
///
impl Responder {
    /// Processes a query and returns the responses.
    ///
    /// Set `tcp` if the query was received over a stream transport. This
    /// lifts the size limit and permits zone transfers.
    pub fn handle(&self, wire: &[u8], tcp: bool) -> Vec<Bytes> {
        if wire.len() < HeaderSection::LEN {
            debug!(len = wire.len(), "dropping message with short header");
            return Vec::new();
        }
        let mut query = match Message::from_slice(wire) {
            Ok(query) => query,
            Err(err) => {
                debug!(%err, "format error in query");
                return error_reply(wire, Rcode::FormErr);
            }
        };
        if query.header().qr() {
            debug!(id = query.header().id(), "dropping response");
            return Vec::new();
        }
        if query.header().opcode() != Opcode::Query {
            debug!(opcode = %query.header().opcode(), "opcode not implemented");
            return error_reply(wire, Rcode::NotImp);
        }
        let question = match query.questions() {
            [question] => question.clone(),
            questions => {
                debug!(count = questions.len(), "bad question count");
                return error_reply(wire, Rcode::FormErr);
            }
        };

        // Check the signature before looking at anything else.
        let query_tsig = query.tsig().cloned();
        let key_name = query.tsig_record().map(|record| record.owner().clone());
        let key = match (&key_name, &query_tsig) {
            (Some(key_name), Some(tsig)) => {
                let key = match self.find_key(key_name) {
                    Some(key) => key,
                    None => {
                        debug!(key = %key_name, "unknown TSIG key");
                        return self.finish(
                            unknown_key_reply(&query, key_name, tsig),
                            tcp,
                        );
                    }
                };
                let res = key.verify(&mut query, None);
                if res != TsigRcode::NoError {
                    let mut response = Message::start_answer(&query);
                    response.header_mut().set_rcode(res.header_rcode());
                    response.set_tsig(key.clone(), res, query_tsig.clone());
                    return self.finish(response, tcp);
                }
                Some(key)
            }
            _ => None,
        };

        match question.qtype() {
            Rtype::Axfr => {
                return self.axfr(&query, question.qname(), key, query_tsig, tcp)
            }
            Rtype::Ixfr => {
                debug!(qname = %question.qname(), "IXFR not implemented");
                return self.finish(
                    self.error_answer(&query, Rcode::NotImp, key, query_tsig),
                    tcp,
                );
            }
            _ => {}
        }

        if self.find_zone(question.qname()).is_none() {
            debug!(qname = %question.qname(), "refused query for foreign zone");
            return self.finish(
                self.error_answer(&query, Rcode::Refused, key, query_tsig),
                tcp,
            );
        }

        let mut response = Message::start_answer(&query);
        self.answer(&mut response, question.qname(), question.qtype());
        self.add_glue(&mut response);
        if let Some(key) = key {
            response.set_tsig(key.clone(), TsigRcode::NoError, query_tsig);
        }
        trace!(
            qname = %question.qname(),
            qtype = %question.qtype(),
            rcode = %response.rcode(),
            "answered query"
        );
        self.finish(response, tcp)
    }

    /// Fills the answer and authority sections.
    fn answer(&self, response: &mut Message, qname: &Name, qtype: Rtype) {
        let mut name = qname.clone();
        for iteration in 0..=self.max_chain {
            let zone = match self.find_zone(&name) {
                Some(zone) => zone,
                None => break,
            };
            if iteration == 0 {
                response.header_mut().set_aa(true);
            }
            match zone.find_records(&name, qtype) {
                SetResponse::Unknown => break,
                SetResponse::NxDomain { soa } => {
                    response.header_mut().set_rcode(Rcode::NXDomain);
                    add_rrset(response, Section::Authority, soa.as_ref());
                    break;
                }
                SetResponse::NxRrset { soa } => {
                    add_rrset(response, Section::Authority, soa.as_ref());
                    break;
                }
                SetResponse::Delegation(ns) => {
                    if iteration == 0 {
                        response.header_mut().set_aa(false);
                    }
                    add_rrset(response, Section::Authority, Some(&ns));
                    break;
                }
                SetResponse::Cname(record) => {
                    let target = match *record.data() {
                        AllRecordData::Cname(ref cname) => cname.cname().clone(),
                        _ => break,
                    };
                    response.add_record_unique(Section::Answer, record);
                    name = target;
                }
                SetResponse::Dname(record) => {
                    let target = match *record.data() {
                        AllRecordData::Dname(ref dname) => dname.dname().clone(),
                        _ => break,
                    };
                    let new_name = match name.replace_suffix(record.owner(), &target) {
                        Ok(new_name) => new_name,
                        Err(err) => {
                            debug!(%name, %err, "DNAME substitution failed");
                            response.add_record_unique(Section::Answer, record);
                            response.header_mut().set_rcode(Rcode::YXDomain);
                            break;
                        }
                    };
                    let synthesized = Record::new(
                        name.clone(),
                        record.class(),
                        record.ttl(),
                        Cname::new(new_name.clone()).into(),
                    );
                    response.add_record_unique(Section::Answer, record);
                    response.add_record_unique(Section::Answer, synthesized);
                    name = new_name;
                }
                SetResponse::Successful(rrsets) => {
                    for rrset in &rrsets {
                        if qtype.is_signature() {
                            for sig in rrset.sigs().iter().filter(|sig| sig.rtype() == qtype) {
                                response.add_record_unique(Section::Answer, sig.clone());
                            }
                        } else {
                            add_rrset(response, Section::Answer, Some(rrset));
                        }
                    }
                    if !response.find_rrset(Section::Answer, &zone.origin(), Rtype::Ns) {
                        add_rrset(response, Section::Authority, zone.ns().as_ref());
                    }
                    break;
                }
            }
        }
    }

    /// Adds addresses for the targets of NS and MX records.
    fn add_glue(&self, response: &mut Message) {
        let targets: Vec<Name> = response
            .answer()
            .iter()
            .chain(response.authority())
            .filter_map(|record| record.data().additional_name().cloned())
            .collect();
        for target in targets {
            let zone = match self.find_zone(&target) {
                Some(zone) => zone,
                None => continue,
            };
            for rtype in [Rtype::A, Rtype::Aaaa] {
                if let Some(rrset) = zone.find_exact(&target, rtype) {
                    add_rrset(response, Section::Additional, Some(&rrset));
                }
            }
        }
    }

    /// Produces the responses for a zone transfer.
    ///
    /// Each RRset goes into a message of its own. The SOA record is sent
    /// first and last. If the query was signed, the messages are signed
    /// as a stream.
    fn axfr(
        &self,
        query: &Message,
        qname: &Name,
        key: Option<&Key>,
        query_tsig: Option<Tsig>,
        tcp: bool,
    ) -> Vec<Bytes> {
        let zone = match self.zones.iter().find(|zone| zone.origin() == *qname) {
            Some(zone) if tcp => zone,
            _ => {
                debug!(%qname, tcp, "refused AXFR");
                return self.finish(
                    self.error_answer(query, Rcode::Refused, key, query_tsig),
                    tcp,
                );
            }
        };
        let rrsets: Vec<Rrset> = zone.axfr_iter().collect();
        debug!(%qname, rrsets = rrsets.len(), "starting AXFR");

        let first = Message::start_answer(query);
        let mut header = *first.header();
        header.set_aa(true);
        let mut signer = key.map(|key| StreamSigner::new(key.clone(), query_tsig));
        let mut res = Vec::with_capacity(rrsets.len());
        for (i, rrset) in rrsets.iter().enumerate() {
            let mut msg = if i == 0 {
                let mut msg = first.clone();
                msg.header_mut().set_aa(true);
                msg
            } else {
                Message::with_header(header)
            };
            for record in rrset.iter_all() {
                msg.add_record(Section::Answer, record.clone());
            }
            let last = i + 1 == rrsets.len();
            let wire = match signer.as_mut() {
                Some(signer) => signer.next(&msg, last),
                None => msg.to_wire(),
            };
            match wire {
                Ok(wire) => res.push(wire),
                Err(err) => {
                    warn!(%qname, %err, "encoding AXFR message failed");
                    return self.finish(
                        self.error_answer(query, Rcode::ServFail, None, None),
                        tcp,
                    );
                }
            }
        }
        res
    }

    /// Creates a header-only error response, signed if the query was.
    fn error_answer(
        &self,
        query: &Message,
        rcode: Rcode,
        key: Option<&Key>,
        query_tsig: Option<Tsig>,
    ) -> Message {
        let mut response = Message::start_answer(query);
        response.header_mut().set_rcode(rcode);
        if let Some(key) = key {
            response.set_tsig(key.clone(), TsigRcode::NoError, query_tsig);
        }
        response
    }

    /// Encodes a single response.
    ///
    /// Over UDP, the response is limited to the configured payload size.
    fn finish(&self, response: Message, tcp: bool) -> Vec<Bytes> {
        let res = if tcp {
            response.to_wire()
        } else {
            response.to_wire_bounded(self.udp_payload)
        };
        match res {
            Ok(wire) => vec![wire],
            Err(err) => {
                warn!(%err, "encoding response failed");
                let mut header = *response.header();
                header.set_rcode(Rcode::ServFail);
                Message::with_header(header).to_wire().into_iter().collect()
            }
        }
    }
}

//------------ Helper Functions ----------------------------------------------

/// Adds the records of an RRset to a section.
fn add_rrset(response: &mut Message, section: Section, rrset: Option<&Rrset>) {
    if let Some(rrset) = rrset {
        for record in rrset.records() {
            response.add_record_unique(section, record.clone());
        }
    }
}

/// Creates the encoded header-only response to a broken query.
fn error_reply(wire: &[u8], rcode: Rcode) -> Vec<Bytes> {
    Message::error_answer(wire, rcode)
        .and_then(|msg| msg.to_wire().ok())
        .into_iter()
        .collect()
}

/// Creates the response for a query signed with an unknown key.
///
/// The response carries an unsigned TSIG record with the BADKEY error.
fn unknown_key_reply(query: &Message, key_name: &Name, tsig: &Tsig) -> Message {
    let mut response = Message::start_answer(query);
    response.header_mut().set_rcode(Rcode::NotAuth);
    response.add_record(
        Section::Additional,
        Record::new(
            key_name.clone(),
            Class::Any,
            0,
            AllRecordData::Tsig(Tsig::new_unchecked(
                tsig.algorithm().clone(),
                Time48::now(),
                tsig.fudge(),
                Bytes::new(),
                query.header().id(),
                TsigRcode::BadKey,
                Bytes::new(),
            )),
        ),
    );
    response
}
