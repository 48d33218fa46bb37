//! Basics.
//!
//! This module provides the types for working with DNS data in wire
//! format. Domain names live in [name] together with the compressor used
//! when writing them into messages. Records, questions, and RRsets are
//! built on top of those and the record data from the
//! [rdata][crate::rdata] module. The [`Message`] type finally represents a
//! complete DNS message with its decoder and encoder, the latter optionally
//! limited to a maximum message size.
//!
//! ## Parsing and Composing Messages
//!
//! We use the term *parsing* for extracting data from a wire-format
//! representation and *composing* for producing such a representation.
//! Reading data from its textual representation is called *scanning*
//! and is supported by the [scan] module.
//!
//! Parsing happens through [octseq]’s parser over the octets of an entire
//! message. Composing writes into a [`BytesMut`][bytes::BytesMut].

pub use self::header::{
    Header, HeaderCounts, HeaderFlags, HeaderSection, Section,
};
pub use self::iana::{Class, Opcode, Rcode, Rtype, TsigRcode};
pub use self::message::{Message, TsigState};
pub use self::name::{Name, NameError};
pub use self::question::Question;
pub use self::record::Record;
pub use self::rrset::Rrset;
pub use self::wire::{ComposeError, FormError, ParseError};

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod record;
pub mod rrset;
pub mod scan;
pub mod stream;
pub mod wire;
