//! Text encodings for binary data in record data and keys.

pub mod base16;
pub mod base64;
