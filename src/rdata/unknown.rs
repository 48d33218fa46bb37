//! Opaque record data for types without a dedicated implementation.
//!
//! Such data is written in the generic `\\# <len> <hex>` form of RFC 3597.

use crate::base::iana::Rtype;
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{parse_slice, ParseError};
use crate::utils::base16;
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use octseq::parse::Parser;

//------------ UnknownRecordData ---------------------------------------------

/// The raw data of a record whose type this crate doesn’t interpret.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnknownRecordData {
    rtype: Rtype,
    data: Bytes,
}

impl UnknownRecordData {
    /// Wraps raw data, which must fit into a 16 bit length.
    #[must_use]
    pub fn from_octets(rtype: Rtype, data: Bytes) -> Option<Self> {
        if data.len() > usize::from(u16::MAX) {
            None
        } else {
            Some(UnknownRecordData { rtype, data })
        }
    }

    #[must_use]
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Takes `rdlen` octets of data for the given type from the parser.
    pub fn parse(
        rtype: Rtype,
        parser: &mut Parser<[u8]>,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        Ok(UnknownRecordData {
            rtype,
            data: Bytes::copy_from_slice(parse_slice(parser, rdlen)?),
        })
    }

    /// Scans data in the generic `\# len hex` format.
    pub fn scan(rtype: Rtype, scanner: &mut Scanner) -> Result<Self, ScanError> {
        if scanner.scan_str()? != "\\#" {
            return Err(ScanError::custom("expected '\\#'"));
        }
        let len: u16 = scanner.scan()?;
        let data = base16::decode_vec(&scanner.scan_remaining())
            .map_err(|err| ScanError::custom(format!("invalid hex: {}", err)))?;
        if data.len() != usize::from(len) {
            return Err(ScanError::custom("generic data has wrong length"));
        }
        Ok(UnknownRecordData {
            rtype,
            data: data.into(),
        })
    }

    pub fn compose_rdata(&self, target: &mut BytesMut) {
        target.put_slice(&self.data)
    }
}

//--- Display

impl fmt::Display for UnknownRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.data.len())?;
        if !self.data.is_empty() {
            f.write_str(" ")?;
            base16::display(&self.data, f)?;
        }
        Ok(())
    }
}
