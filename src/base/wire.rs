//! Creating and consuming data in wire format.
//!
//! Parsing happens through octseq’s [`Parser`] over an octets slice that
//! always covers the complete message, so that compressed names can follow
//! their pointers. Composing happens into a [`BytesMut`] buffer.

use bytes::{BufMut, BytesMut};
use core::fmt;
use octseq::parse::{Parser, ShortInput};

//------------ Parse ---------------------------------------------------------

/// A value that can be read from a message.
///
/// The parser spans the whole message so compression pointers in names
/// can be followed.
pub trait Parse: Sized {
    /// Reads the value at the parser’s position.
    ///
    /// After an error, the position is unspecified.
    fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError>;
}

/// Takes `len` octets from the parser.
pub fn parse_slice<'a>(
    parser: &mut Parser<'a, [u8]>,
    len: usize,
) -> Result<&'a [u8], ParseError> {
    let start = parser.pos();
    parser.advance(len)?;
    Ok(&parser.octets_ref()[start..start + len])
}

/// Takes everything that is left in the parser.
pub fn parse_remaining<'a>(parser: &mut Parser<'a, [u8]>) -> &'a [u8] {
    let start = parser.pos();
    let end = start + parser.remaining();
    // Advancing by the remaining length cannot fail.
    let _ = parser.advance(parser.remaining());
    &parser.octets_ref()[start..end]
}

/// Parses a 48 bit unsigned integer in network byte order.
pub fn parse_u48(parser: &mut Parser<[u8]>) -> Result<u64, ParseError> {
    let mut buf = [0u8; 8];
    parser.parse_buf(&mut buf[2..])?;
    Ok(u64::from_be_bytes(buf))
}

//------------ compose functions ---------------------------------------------

/// Composes some data prefixed by its length as a 16 bit value.
///
/// If the data turns out to be longer than 65535 octets, the target is
/// truncated back to where it was and an error is returned.
pub fn compose_len_prefixed<F>(
    target: &mut BytesMut,
    op: F,
) -> Result<(), ComposeError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), ComposeError>,
{
    let start = target.len();
    target.put_u16(0);
    let pos = target.len();
    match op(target) {
        Ok(()) => match u16::try_from(target.len() - pos) {
            Ok(len) => {
                target[pos - 2..pos].copy_from_slice(&len.to_be_bytes());
                Ok(())
            }
            Err(_) => {
                target.truncate(start);
                Err(ComposeError::LongData)
            }
        },
        Err(err) => {
            target.truncate(start);
            Err(err)
        }
    }
}

/// Composes a 48 bit unsigned integer in network byte order.
///
/// Only the lower 48 bits of `value` are used.
pub fn compose_u48(target: &mut BytesMut, value: u64) {
    target.put_slice(&value.to_be_bytes()[2..]);
}

//============ Error Types ===================================================

//------------ ParseError ----------------------------------------------------

/// Wire data could not be decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The data ended early.
    ShortInput,

    /// The data was malformed.
    Form(FormError),
}

impl ParseError {
    /// Creates a malformed data error.
    #[must_use]
    pub fn form_error(msg: &'static str) -> Self {
        FormError::new(msg).into()
    }
}

impl From<ShortInput> for ParseError {
    fn from(_: ShortInput) -> Self {
        ParseError::ShortInput
    }
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(ref err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// Wire data violates the format.
///
/// The string says what was wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    #[must_use]
    pub fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FormError {}

//------------ ComposeError --------------------------------------------------

/// A message could not be encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposeError {
    /// The size limit leaves no room for the header and signature.
    ShortBuf,

    /// Length-prefixed data is longer than its length field can express.
    LongData,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ComposeError::ShortBuf => f.write_str("buffer size exceeded"),
            ComposeError::LongData => f.write_str("data too long"),
        }
    }
}

impl std::error::Error for ComposeError {}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn len_prefixed() {
        let mut buf = BytesMut::new();
        buf.put_u8(7);
        compose_len_prefixed(&mut buf, |buf| {
            buf.put_slice(b"foo");
            Ok(())
        })
        .unwrap();
        assert_eq!(buf.as_ref(), b"\x07\x00\x03foo");

        let err = compose_len_prefixed(&mut buf, |buf| {
            buf.put_slice(&[0u8; 0x1_0000]);
            Ok(())
        });
        assert_eq!(err, Err(ComposeError::LongData));
        assert_eq!(buf.as_ref(), b"\x07\x00\x03foo");
    }

    #[test]
    fn u48() {
        let mut buf = BytesMut::new();
        compose_u48(&mut buf, 0x0102_0304_0506);
        assert_eq!(buf.as_ref(), b"\x01\x02\x03\x04\x05\x06");
        let mut parser = Parser::from_ref(buf.as_ref());
        assert_eq!(parse_u48(&mut parser), Ok(0x0102_0304_0506));
        assert_eq!(parse_u48(&mut parser), Err(ParseError::ShortInput));
    }
}
