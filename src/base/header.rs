//! The twelve octets opening every message (RFC 1035, section 4.1.1).
//!
//! [`HeaderSection`] combines the leading [`Header`] with the four record
//! counters in [`HeaderCounts`].

use super::iana::{Opcode, Rcode};
use super::wire::{Parse, ParseError};
use bytes::{BufMut, BytesMut};
use core::fmt;
use octseq::parse::Parser;

//------------ Header --------------------------------------------------------

/// Defines getter and setter for each flag bit plus a table of them all.
macro_rules! flag {
    ( $( $(#[$attr:meta])*
         ($get:ident, $set:ident, $mnemonic:literal, $octet:expr, $bit:expr)
    )* ) => {
        impl Header {
            const FLAG_BITS: &'static [(&'static str, usize, u8)] = &[
                $( ($mnemonic, $octet, $bit), )*
            ];

            $(
                $(#[$attr])*
                #[must_use]
                pub fn $get(self) -> bool {
                    self.inner[$octet] & (1 << $bit) != 0
                }

                $(#[$attr])*
                pub fn $set(&mut self, set: bool) {
                    if set {
                        self.inner[$octet] |= 1 << $bit
                    } else {
                        self.inner[$octet] &= !(1 << $bit)
                    }
                }
            )*
        }
    }
}

/// The ID, opcode, flags, and rcode of a message.
///
/// These occupy the first four octets of a message and are kept in their
/// wire form:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|Z |AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    inner: [u8; 4],
}

impl Header {
    /// Creates a new header with all fields zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header from the first four octets of a message.
    ///
    /// Returns `None` if the slice is too short.
    #[must_use]
    pub fn from_message_slice(s: &[u8]) -> Option<Self> {
        let inner = s.get(..4)?.try_into().ok()?;
        Some(Header { inner })
    }

    /// Returns the four octets of the header.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }
}

impl Header {
    #[must_use]
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    pub fn set_id(&mut self, id: u16) {
        let [hi, lo] = id.to_be_bytes();
        self.inner[0] = hi;
        self.inner[1] = lo;
    }

    /// Picks a random ID for a new query.
    #[cfg(feature = "rand")]
    pub fn set_random_id(&mut self) {
        self.set_id(rand::random())
    }

    #[must_use]
    pub fn opcode(self) -> Opcode {
        Opcode::from_int(self.inner[2] >> 3 & 0b1111)
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        let bits = (opcode.to_int() & 0b1111) << 3;
        self.inner[2] = (self.inner[2] & 0b1000_0111) | bits;
    }

    /// The set flag bits in dig’s notation, such as `qr aa rd`.
    #[must_use]
    pub fn flags(self) -> HeaderFlags {
        HeaderFlags(self)
    }

    /// The lower four bits of the response code.
    ///
    /// Extended codes only exist in OPT and TSIG records.
    #[must_use]
    pub fn rcode(self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0b1111)
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        let bits = rcode.to_int() & 0b1111;
        self.inner[3] = (self.inner[3] & 0b1111_0000) | bits;
    }
}

flag! {
    /// The message is a response rather than a query.
    (qr, set_qr, "qr", 2, 7)

    /// The responding server is an authority for the question.
    (aa, set_aa, "aa", 2, 2)

    /// The message has been truncated to fit the transport.
    (tc, set_tc, "tc", 2, 1)

    /// The client asks for recursive resolution.
    (rd, set_rd, "rd", 2, 0)

    /// The server offers recursive resolution.
    (ra, set_ra, "ra", 3, 7)

    /// The reserved bit. It must be unset in all messages.
    (z, set_z, "z", 3, 6)

    /// The data in the response has been authenticated.
    (ad, set_ad, "ad", 3, 5)

    /// The client disables DNSSEC checking.
    (cd, set_cd, "cd", 3, 4)
}

//------------ HeaderFlags ---------------------------------------------------

/// Displays the flag bits set in a header.
#[derive(Clone, Copy, Debug)]
pub struct HeaderFlags(Header);

impl fmt::Display for HeaderFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.0.inner;
        let mut set = Header::FLAG_BITS
            .iter()
            .filter(|(_, octet, bit)| inner[*octet] & (1u8 << *bit) != 0)
            .map(|(mnemonic, _, _)| mnemonic);
        if let Some(first) = set.next() {
            f.write_str(first)?;
            for mnemonic in set {
                write!(f, " {}", mnemonic)?;
            }
        }
        Ok(())
    }
}

//------------ Section -------------------------------------------------------

/// The four sections of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    /// All sections in message order.
    pub const ALL: [Section; 4] = [
        Section::Question,
        Section::Answer,
        Section::Authority,
        Section::Additional,
    ];

    fn index(self) -> usize {
        match self {
            Section::Question => 0,
            Section::Answer => 1,
            Section::Authority => 2,
            Section::Additional => 3,
        }
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The number of entries in each section, in section order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts {
    counts: [u16; 4],
}

impl HeaderCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(self, section: Section) -> u16 {
        self.counts[section.index()]
    }

    pub fn set(&mut self, section: Section, value: u16) {
        self.counts[section.index()] = value
    }

    #[must_use]
    pub fn qdcount(self) -> u16 {
        self.get(Section::Question)
    }

    #[must_use]
    pub fn ancount(self) -> u16 {
        self.get(Section::Answer)
    }

    #[must_use]
    pub fn nscount(self) -> u16 {
        self.get(Section::Authority)
    }

    #[must_use]
    pub fn arcount(self) -> u16 {
        self.get(Section::Additional)
    }
}

//------------ HeaderSection -------------------------------------------------

/// Header and counts together, as they appear on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderSection {
    header: Header,
    counts: HeaderCounts,
}

impl HeaderSection {
    /// The length of the header section in wire format.
    pub const LEN: usize = 12;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(header: Header, counts: HeaderCounts) -> Self {
        HeaderSection { header, counts }
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    #[must_use]
    pub fn counts(&self) -> &HeaderCounts {
        &self.counts
    }

    pub fn counts_mut(&mut self) -> &mut HeaderCounts {
        &mut self.counts
    }

    /// Appends the wire format of the header section.
    pub fn compose(&self, target: &mut BytesMut) {
        target.put_slice(self.header.as_slice());
        for count in self.counts.counts {
            target.put_u16(count);
        }
    }

    /// Overwrites the first twelve octets of `target` with the header.
    ///
    /// The target must be at least twelve octets long.
    pub fn write_into(&self, target: &mut [u8]) {
        target[..4].copy_from_slice(self.header.as_slice());
        for (i, count) in self.counts.counts.iter().enumerate() {
            target[4 + 2 * i..6 + 2 * i].copy_from_slice(&count.to_be_bytes());
        }
    }
}

impl Parse for HeaderSection {
    fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        let mut inner = [0u8; 4];
        parser.parse_buf(&mut inner)?;
        let mut counts = HeaderCounts::new();
        for section in Section::ALL {
            counts.set(section, parser.parse_u16_be()?);
        }
        Ok(HeaderSection {
            header: Header { inner },
            counts,
        })
    }
}

//============ Tests =========================================================
