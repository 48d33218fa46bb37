//! Hex digits as used by the generic record data format of RFC 3597.
//!
//! Output uses uppercase digits, input accepts either case.

use core::fmt;

/// Converts a string of hex digits into octets.
///
/// The string needs an even number of digits and no whitespace.
pub fn decode_vec(s: &str) -> Result<Vec<u8>, DecodeError> {
    let s = s.as_bytes();
    if s.len() % 2 != 0 {
        return Err(DecodeError::ShortInput);
    }
    s.chunks(2)
        .map(|pair| -> Result<u8, DecodeError> {
            Ok(digit(pair[0])? << 4 | digit(pair[1])?)
        })
        .collect()
}

fn digit(ch: u8) -> Result<u8, DecodeError> {
    match ch {
        b'0'..=b'9' => Ok(ch - b'0'),
        b'a'..=b'f' => Ok(ch - b'a' + 10),
        b'A'..=b'F' => Ok(ch - b'A' + 10),
        _ => Err(DecodeError::IllegalChar(char::from(ch))),
    }
}

/// Writes the octets as hex digits, e.g., inside a `Display` impl.
pub fn display<Octets, Target>(octets: &Octets, f: &mut Target) -> fmt::Result
where
    Octets: AsRef<[u8]> + ?Sized,
    Target: fmt::Write,
{
    for &octet in octets.as_ref() {
        write!(f, "{:02X}", octet)?;
    }
    Ok(())
}

/// Returns the octets as a string of hex digits.
pub fn encode_string<B: AsRef<[u8]> + ?Sized>(bytes: &B) -> String {
    let mut res = String::with_capacity(bytes.as_ref().len() * 2);
    // Writing to a string never fails.
    let _ = display(bytes, &mut res);
    res
}

//------------ DecodeError ---------------------------------------------------

/// A string wasn’t valid hex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The input ended in the middle of an octet.
    ShortInput,

    /// The input contained a character that is not a hex digit.
    IllegalChar(char),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::ShortInput => f.write_str("incomplete input"),
            DecodeError::IllegalChar(ch) => {
                write!(f, "illegal character '{}'", ch)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

//============ Test ==========================================================
