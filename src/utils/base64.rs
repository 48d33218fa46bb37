//! Base 64 with the standard alphabet and padding.
//!
//! This is what TSIG key files and the presentation format of signature
//! records use. Zone files may split the data into several tokens, so
//! decoding skips whitespace.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core::fmt;

pub use base64::DecodeError;

/// Converts Base 64 text into octets, ignoring whitespace.
pub fn decode_vec(s: &str) -> Result<Vec<u8>, DecodeError> {
    if s.bytes().any(|ch| ch.is_ascii_whitespace()) {
        let s: String = s.chars().filter(|ch| !ch.is_whitespace()).collect();
        STANDARD.decode(s)
    } else {
        STANDARD.decode(s)
    }
}

/// Writes the octets as Base 64 into a formatter.
pub fn display<B, W>(bytes: &B, f: &mut W) -> fmt::Result
where
    B: AsRef<[u8]> + ?Sized,
    W: fmt::Write,
{
    f.write_str(&STANDARD.encode(bytes.as_ref()))
}

/// Returns the octets as Base 64 text.
pub fn encode_string<B: AsRef<[u8]> + ?Sized>(bytes: &B) -> String {
    STANDARD.encode(bytes.as_ref())
}

//============ Test ==========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_with_whitespace() {
        assert_eq!(decode_vec("Zm9v YmFy").unwrap(), b"foobar");
        assert_eq!(decode_vec("Zm9vYg==").unwrap(), b"foob");
        assert!(decode_vec("Zm9vY").is_err());
    }

    #[test]
    fn encode() {
        assert_eq!(encode_string(b"foob"), "Zm9vYg==");
    }
}
