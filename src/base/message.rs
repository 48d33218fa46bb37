//! Accessing and creating DNS messages.
//!
//! This module defines the [`Message`] type. A message consists of the
//! header and the four sections: the question section with a sequence of
//! questions and the answer, authority, and additional sections each
//! holding a sequence of resource records.
//!
//! Messages are decoded from their wire format through
//! [`Message::from_octets`]. The original octets are kept around since
//! verifying a transaction signature needs them exactly as received.
//!
//! The encoder can limit the size of the produced message. In that case,
//! it drops complete record sets from the end of the message and marks the
//! message as truncated. If a TSIG key has been attached via
//! [`Message::set_tsig`], space for the signature record is reserved and
//! the record is added after all sections have been written.

use super::header::{Header, HeaderCounts, HeaderSection, Section};
use super::iana::{Class, Opcode, Rcode, Rtype, TsigRcode};
use super::name::{Compressor, Name};
use super::question::Question;
use super::record::Record;
use super::wire::{ComposeError, Parse, ParseError};
use crate::rdata::{AllRecordData, Tsig};
use crate::tsig::{Key, TsigSigner};
use bytes::{Bytes, BytesMut};
use core::fmt;
use octseq::parse::Parser;
use tracing::debug;

//------------ TsigState -----------------------------------------------------

/// The state of a message with respect to transaction signatures.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TsigState {
    /// The message has not been signed or verified.
    #[default]
    Unsigned,

    /// The message has been signed or will be signed when encoded.
    Signed,

    /// The signature of a received message was checked successfully.
    Verified,

    /// Checking the signature of a received message failed.
    Failed,

    /// An unsigned message in the middle of a signed message stream.
    ///
    /// This is fine as long as a later message carries a signature.
    Intermediate,
}

impl TsigState {
    /// Returns whether the message is considered signed.
    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            TsigState::Signed | TsigState::Verified | TsigState::Failed
        )
    }
}

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// The message keeps its header flags while the section counts are
/// derived from the content of the sections when encoding.
#[derive(Clone, Debug, Default)]
pub struct Message {
    header: Header,
    questions: Vec<Question>,
    answer: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,

    /// The octets the message was decoded from.
    wire: Option<Bytes>,

    /// The position of a TSIG record in `wire`.
    tsig_start: Option<usize>,

    /// The position of a SIG(0) record in `wire`.
    sig0_start: Option<usize>,

    tsig_state: TsigState,

    /// A key to sign the message with when encoding.
    signer: Option<TsigSigner>,
}

/// # Creation
///
impl Message {
    /// Creates a new, empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message from a header.
    #[must_use]
    pub fn with_header(header: Header) -> Self {
        Message {
            header,
            ..Default::default()
        }
    }

    /// Creates a new query for the given name, type, and class.
    ///
    /// The recursion desired bit is set. If the `rand` feature is enabled,
    /// the message ID is chosen randomly.
    #[must_use]
    pub fn new_query(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        let mut res = Self::new();
        #[cfg(feature = "rand")]
        res.header.set_random_id();
        res.header.set_opcode(Opcode::Query);
        res.header.set_rd(true);
        res.questions.push(Question::new(qname, qtype, qclass));
        res
    }

    /// Starts an answer to the given query.
    ///
    /// Copies the ID, opcode, RD flag, and the question section and sets
    /// the QR flag.
    #[must_use]
    pub fn start_answer(query: &Message) -> Self {
        let mut header = Header::new();
        header.set_id(query.header.id());
        header.set_qr(true);
        header.set_opcode(query.header.opcode());
        header.set_rd(query.header.rd());
        header.set_cd(query.header.cd());
        let mut res = Self::with_header(header);
        res.questions = query.questions.clone();
        res
    }

    /// Creates an error response from the octets of a received message.
    ///
    /// Only the header is used so that this works even if the rest of the
    /// message is broken. Returns `None` if even the header is too short.
    #[must_use]
    pub fn error_answer(octets: &[u8], rcode: Rcode) -> Option<Self> {
        let query = Header::from_message_slice(octets)?;
        let mut header = Header::new();
        header.set_id(query.id());
        header.set_qr(true);
        header.set_opcode(query.opcode());
        header.set_rd(query.rd());
        header.set_rcode(rcode);
        Some(Self::with_header(header))
    }

    /// Decodes a message from its wire format.
    ///
    /// If a record fails to parse but the TC flag of the header is set,
    /// the error is ignored and all data parsed so far is returned.
    pub fn from_octets(octets: Bytes) -> Result<Self, ParseError> {
        let mut parser = Parser::from_ref(&octets[..]);
        let section = HeaderSection::parse(&mut parser)?;
        let mut res = Self::with_header(*section.header());
        if let Err(err) = res.parse_sections(&mut parser, *section.counts()) {
            if res.header.tc() {
                debug!(
                    id = res.header.id(),
                    %err,
                    "ignoring error in truncated message"
                );
            } else {
                return Err(err);
            }
        }
        res.wire = Some(octets);
        Ok(res)
    }

    /// Decodes a message from a slice.
    pub fn from_slice(octets: &[u8]) -> Result<Self, ParseError> {
        Self::from_octets(Bytes::copy_from_slice(octets))
    }

    fn parse_sections(
        &mut self,
        parser: &mut Parser<[u8]>,
        counts: HeaderCounts,
    ) -> Result<(), ParseError> {
        for _ in 0..counts.qdcount() {
            self.questions.push(Question::parse(parser)?);
        }
        for section in [Section::Answer, Section::Authority, Section::Additional]
        {
            let count = counts.get(section);
            for i in 0..count {
                let pos = parser.pos();
                let record = Record::parse(parser)?;
                let last = section == Section::Additional && i + 1 == count;
                match *record.data() {
                    AllRecordData::Tsig(_) => {
                        if !last {
                            return Err(ParseError::form_error(
                                "TSIG record is not the last record",
                            ));
                        }
                        self.tsig_start = Some(pos);
                    }
                    AllRecordData::Sig(ref sig)
                        if sig.type_covered() == Rtype::from_int(0) =>
                    {
                        if !last {
                            return Err(ParseError::form_error(
                                "SIG(0) record is not the last record",
                            ));
                        }
                        self.sig0_start = Some(pos);
                    }
                    _ => {}
                }
                self.add_record(section, record);
            }
        }
        Ok(())
    }
}

/// # Access to Header and Sections
///
impl Message {
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the section counts as they follow from the content.
    ///
    /// A section with more than 65535 entries reports 65535. Such a
    /// message cannot be encoded.
    #[must_use]
    pub fn counts(&self) -> HeaderCounts {
        let mut res = HeaderCounts::new();
        for section in Section::ALL {
            let len = self.section_len(section);
            res.set(section, u16::try_from(len).unwrap_or(u16::MAX));
        }
        res
    }

    fn wire_counts(&self) -> Result<HeaderCounts, ComposeError> {
        let mut res = HeaderCounts::new();
        for section in Section::ALL {
            let len = u16::try_from(self.section_len(section))
                .map_err(|_| ComposeError::LongData)?;
            res.set(section, len);
        }
        Ok(res)
    }

    /// Returns the rcode of the message.
    #[must_use]
    pub fn rcode(&self) -> Rcode {
        self.header.rcode()
    }

    /// Returns the question section.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question.
    #[must_use]
    pub fn first_question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Appends a question to the question section.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question)
    }

    #[must_use]
    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    #[must_use]
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    #[must_use]
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Returns the records of a section.
    ///
    /// The question section has no records and an empty slice is
    /// returned for it.
    #[must_use]
    pub fn records(&self, section: Section) -> &[Record] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answer,
            Section::Authority => &self.authority,
            Section::Additional => &self.additional,
        }
    }

    fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Question => self.questions.len(),
            other => self.records(other).len(),
        }
    }

    fn section_mut(&mut self, section: Section) -> Option<&mut Vec<Record>> {
        match section {
            Section::Question => None,
            Section::Answer => Some(&mut self.answer),
            Section::Authority => Some(&mut self.authority),
            Section::Additional => Some(&mut self.additional),
        }
    }

    /// Adds a record to a section.
    ///
    /// Adding a record to the question section adds a question for the
    /// record’s owner, type, and class.
    pub fn add_record(&mut self, section: Section, record: Record) {
        match self.section_mut(section) {
            Some(records) => records.push(record),
            None => self.questions.push(Question::new(
                record.owner().clone(),
                record.rtype(),
                record.class(),
            )),
        }
    }

    /// Adds a record unless it already is present in the section.
    ///
    /// Returns whether the record was added.
    pub fn add_record_unique(&mut self, section: Section, record: Record) -> bool {
        if self.records(section).contains(&record) {
            false
        } else {
            self.add_record(section, record);
            true
        }
    }

    /// Returns whether a section has records of the given name and type.
    #[must_use]
    pub fn find_rrset(&self, section: Section, name: &Name, rtype: Rtype) -> bool {
        self.records(section)
            .iter()
            .any(|r| r.owner() == name && r.rrset_type() == rtype)
    }
}

/// # Transaction Signatures
///
impl Message {
    /// Returns the TSIG record if the message has one.
    ///
    /// The record is always the last record of the additional section.
    #[must_use]
    pub fn tsig_record(&self) -> Option<&Record> {
        self.additional
            .last()
            .filter(|record| record.rtype() == Rtype::Tsig)
    }

    /// Returns the TSIG record data if the message has a TSIG record.
    #[must_use]
    pub fn tsig(&self) -> Option<&Tsig> {
        match self.tsig_record()?.data() {
            AllRecordData::Tsig(tsig) => Some(tsig),
            _ => None,
        }
    }

    /// Returns the position of the TSIG record in the received octets.
    #[must_use]
    pub fn tsig_start(&self) -> Option<usize> {
        self.tsig_start
    }

    /// Returns the position of a SIG(0) record in the received octets.
    #[must_use]
    pub fn sig0_start(&self) -> Option<usize> {
        self.sig0_start
    }

    #[must_use]
    pub fn tsig_state(&self) -> TsigState {
        self.tsig_state
    }

    pub fn set_tsig_state(&mut self, state: TsigState) {
        self.tsig_state = state
    }

    /// Returns the octets the message was decoded from.
    #[must_use]
    pub fn as_wire(&self) -> Option<&Bytes> {
        self.wire.as_ref()
    }

    /// Attaches a key the message will be signed with when encoded.
    ///
    /// The `error` will be placed in the TSIG record. For a response,
    /// `previous` is the TSIG record of the request which is included in
    /// the signature.
    pub fn set_tsig(
        &mut self,
        key: Key,
        error: TsigRcode,
        previous: Option<Tsig>,
    ) {
        self.signer = Some(TsigSigner::new(key, error, previous));
        self.tsig_state = TsigState::Signed;
    }

    /// Removes the TSIG record and any attached key.
    pub fn remove_tsig(&mut self) {
        if self.tsig_record().is_some() {
            self.additional.pop();
        }
        self.signer = None;
        self.tsig_state = TsigState::Unsigned;
    }
}

/// # Encoding
///
impl Message {
    /// Encodes the message with name compression.
    pub fn to_wire(&self) -> Result<Bytes, ComposeError> {
        self.render(Some(Compressor::new()), None)
    }

    /// Encodes the message without name compression.
    pub fn to_wire_uncompressed(&self) -> Result<Bytes, ComposeError> {
        self.render(None, None)
    }

    /// Encodes the message into at most `max_len` octets.
    ///
    /// If not all records fit, complete RRsets are dropped from the end of
    /// the first section that overflows, all later sections are dropped
    /// entirely, and the TC flag is set. Fails only if not even the header
    /// and the TSIG record fit.
    pub fn to_wire_bounded(
        &self,
        max_len: usize,
    ) -> Result<Bytes, ComposeError> {
        self.render(Some(Compressor::new()), Some(max_len))
    }

    /// Encodes the message using the given compressor and optional limit.
    pub fn to_wire_with(
        &self,
        compressor: Compressor,
        max_len: Option<usize>,
    ) -> Result<Bytes, ComposeError> {
        self.render(Some(compressor), max_len)
    }

    fn render(
        &self,
        mut compressor: Option<Compressor>,
        max_len: Option<usize>,
    ) -> Result<Bytes, ComposeError> {
        let reserve = self.signer.as_ref().map_or(0, |s| s.key().record_length());
        let limit = match max_len {
            Some(max_len) => {
                let limit = max_len
                    .checked_sub(reserve)
                    .filter(|limit| *limit >= HeaderSection::LEN)
                    .ok_or(ComposeError::ShortBuf)?;
                Some(limit)
            }
            None => None,
        };

        let mut target = BytesMut::with_capacity(512);
        let mut section =
            HeaderSection::from_parts(self.header, self.wire_counts()?);
        section.compose(&mut target);

        for which in Section::ALL {
            let total = self.section_len(which);
            let written = if which == Section::Question {
                compose_questions(
                    &self.questions,
                    &mut target,
                    compressor.as_mut(),
                    limit,
                )
            } else {
                compose_records(
                    self.records(which),
                    &mut target,
                    compressor.as_mut(),
                    limit,
                )?
            };
            if written < total {
                debug!(
                    section = ?which,
                    written,
                    total,
                    "truncating message"
                );
                section.header_mut().set_tc(true);
                let written = u16::try_from(written)
                    .map_err(|_| ComposeError::LongData)?;
                section.counts_mut().set(which, written);
                for later in Section::ALL.iter().filter(|s| **s > which) {
                    section.counts_mut().set(*later, 0);
                }
                section.write_into(&mut target);
                break;
            }
        }

        if let Some(signer) = self.signer.as_ref() {
            let record = signer.sign(&target);
            record.compose(&mut target, None)?;
            let arcount = section
                .counts()
                .arcount()
                .checked_add(1)
                .ok_or(ComposeError::LongData)?;
            section.counts_mut().set(Section::Additional, arcount);
            section.write_into(&mut target);
        }
        Ok(target.freeze())
    }
}

/// Appends questions until the limit is reached.
///
/// Returns the number of questions written.
fn compose_questions(
    questions: &[Question],
    target: &mut BytesMut,
    mut compressor: Option<&mut Compressor>,
    limit: Option<usize>,
) -> usize {
    for (i, question) in questions.iter().enumerate() {
        let pos = target.len();
        question.compose(target, compressor.as_deref_mut());
        if limit.map_or(false, |limit| target.len() > limit) {
            rollback(target, compressor, pos);
            return i;
        }
    }
    questions.len()
}

/// Appends records until the limit is reached.
///
/// Never writes only part of an RRset run, i.e., a sequence of records
/// with the same owner, type, and class. Returns the number of records
/// written.
fn compose_records(
    records: &[Record],
    target: &mut BytesMut,
    mut compressor: Option<&mut Compressor>,
    limit: Option<usize>,
) -> Result<usize, ComposeError> {
    let mut run_pos = target.len();
    let mut run_start = 0;
    for (i, record) in records.iter().enumerate() {
        if i > 0 && !record.same_rrset(&records[i - 1]) {
            run_pos = target.len();
            run_start = i;
        }
        let res = record.compose(target, compressor.as_deref_mut());
        match limit {
            Some(limit) if res.is_err() || target.len() > limit => {
                rollback(target, compressor, run_pos);
                return Ok(run_start);
            }
            _ => res?,
        }
    }
    Ok(records.len())
}

fn rollback(
    target: &mut BytesMut,
    compressor: Option<&mut Compressor>,
    pos: usize,
) {
    target.truncate(pos);
    if let Some(compressor) = compressor {
        compressor.truncate(pos);
    }
}

//--- Display

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let counts = self.counts();
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {}, rcode: {}, id: {}",
            self.header.opcode(),
            self.header.rcode(),
            self.header.id()
        )?;
        writeln!(
            f,
            ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.header.flags(),
            counts.qdcount(),
            counts.ancount(),
            counts.nscount(),
            counts.arcount()
        )?;
        writeln!(f, "\n;; QUESTION SECTION:")?;
        for question in &self.questions {
            writeln!(f, ";{}", question)?;
        }
        for (title, section) in [
            ("ANSWER", Section::Answer),
            ("AUTHORITY", Section::Authority),
            ("ADDITIONAL", Section::Additional),
        ] {
            let records = self.records(section);
            if !records.is_empty() {
                writeln!(f, "\n;; {} SECTION:", title)?;
                for record in records {
                    writeln!(f, "{}", record)?;
                }
            }
        }
        Ok(())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;

    fn record(s: &str) -> Record {
        Record::from_str(s).unwrap()
    }

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn too_many_records() {
        let mut msg = Message::new();
        let a = record("www.example.com. 60 A 192.0.2.1");
        for _ in 0..=usize::from(u16::MAX) {
            msg.add_record(Section::Answer, a.clone());
        }
        assert_eq!(msg.counts().ancount(), u16::MAX);
        assert_eq!(msg.to_wire(), Err(ComposeError::LongData));
        assert_eq!(msg.to_wire_bounded(512), Err(ComposeError::LongData));

        msg.section_mut(Section::Answer).unwrap().pop();
        assert_eq!(msg.to_wire().map(|wire| wire.len() > 512), Ok(true));
    }

    #[test]
    fn start_answer_copies_query() {
        let mut query = Message::new_query(name("example.com."), Rtype::A, Class::In);
        query.header_mut().set_id(0x1234);
        let answer = Message::start_answer(&query);
        assert_eq!(answer.header().id(), 0x1234);
        assert!(answer.header().qr());
        assert!(answer.header().rd());
        assert_eq!(answer.questions(), query.questions());
    }

    #[test]
    fn error_answer_from_broken_message() {
        let mut query = Message::new_query(name("example.com."), Rtype::A, Class::In);
        query.header_mut().set_id(7);
        let wire = query.to_wire().unwrap();
        let answer = Message::error_answer(&wire[..14], Rcode::FormErr).unwrap();
        assert_eq!(answer.header().id(), 7);
        assert_eq!(answer.rcode(), Rcode::FormErr);
        assert!(answer.questions().is_empty());
        assert!(Message::error_answer(&wire[..11], Rcode::FormErr).is_none());
    }

    #[test]
    fn truncated_message_parses_partially() {
        let mut msg = Message::new();
        msg.add_question(Question::new_in(name("example.com."), Rtype::A));
        msg.add_record(Section::Answer, record("example.com. 60 A 192.0.2.1"));
        msg.add_record(Section::Answer, record("example.com. 60 A 192.0.2.2"));
        let wire = msg.to_wire().unwrap();
        let cut = Bytes::copy_from_slice(&wire[..wire.len() - 3]);
        assert!(Message::from_octets(cut.clone()).is_err());

        let mut cut = BytesMut::from(&cut[..]);
        cut[2] |= 0x02;
        let parsed = Message::from_octets(cut.freeze()).unwrap();
        assert!(parsed.header().tc());
        assert_eq!(parsed.answer().len(), 1);
    }

    #[test]
    fn tsig_must_be_last() {
        let tsig = record(
            "key.example. 0 ANY TSIG hmac-sha256. 1 300 0 1 NOERROR 0",
        );
        let mut msg = Message::new();
        msg.add_record(Section::Additional, tsig.clone());
        msg.add_record(Section::Additional, record("a.example. A 192.0.2.1"));
        let wire = msg.to_wire().unwrap();
        assert!(Message::from_octets(wire).is_err());

        let mut msg = Message::new();
        msg.add_record(Section::Additional, record("a.example. A 192.0.2.1"));
        msg.add_record(Section::Additional, tsig);
        let wire = msg.to_wire().unwrap();
        let parsed = Message::from_octets(wire).unwrap();
        assert!(parsed.tsig().is_some());
        assert_eq!(parsed.tsig_start(), Some(12 + 25));
        assert_eq!(parsed.tsig_state(), TsigState::Unsigned);
    }

    #[test]
    fn bounded_keeps_rrsets_whole() {
        let mut msg = Message::new();
        msg.add_record(Section::Answer, record("a.example. 60 A 192.0.2.1"));
        msg.add_record(Section::Answer, record("b.example. 60 A 192.0.2.1"));
        msg.add_record(Section::Answer, record("b.example. 60 A 192.0.2.2"));
        msg.add_record(Section::Additional, record("c.example. 60 A 192.0.2.1"));
        let full = msg.to_wire().unwrap();

        // Room for the first record and half of the second RRset.
        let wire = msg.to_wire_bounded(full.len() - 30).unwrap();
        let parsed = Message::from_octets(wire).unwrap();
        assert!(parsed.header().tc());
        assert_eq!(parsed.answer().len(), 1);
        assert!(parsed.additional().is_empty());

        let wire = msg.to_wire_bounded(full.len()).unwrap();
        assert_eq!(wire, full);
        assert!(msg.to_wire_bounded(11).is_err());
    }
}
