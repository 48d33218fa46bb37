//! A DNS wire codec with transaction signatures and authoritative zones.
//!
//! This crate provides the building blocks for answering DNS queries from
//! in-memory zone data. It is organised into a number of modules:
//!
//! * [base] contains the fundamental types: domain names and their
//!   compression, the message header, records and RRsets, and the
//!   [`Message`][base::Message] type with its encoder and decoder,
//! * [rdata] contains the record data types for the record types this
//!   crate knows about as well as a fallback for all others,
//! * [tsig] implements transaction signatures as defined in RFC 8945,
//!   including the verification of multi-message responses,
//! * [zone] provides an authoritative zone and its lookup algorithm,
//! * [zonefile] reads zone data from its textual master file form, and
//! * [responder] puts all of that together into something that turns a
//!   received query into the messages to send back.
//!
//! The crate performs no I/O itself. Transports hand it the octets of a
//! received message and get back the octets to send. For stream
//! transports, [`base::stream`] provides the two octet length framing.
//!
//! # Feature Flags
//!
//! * `rand`: enables creating queries with random message IDs. This
//!   feature is enabled by default.

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]

pub mod base;
pub mod rdata;
pub mod responder;
pub mod tsig;
pub mod utils;
pub mod zone;
pub mod zonefile;
