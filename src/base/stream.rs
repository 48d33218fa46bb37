//! Framing of messages on stream transports.
//!
//! When DNS messages are sent over TCP, each message is preceded by its
//! length as a 16 bit unsigned integer in network byte order. This module
//! adds the prefix to outgoing messages and splits a received byte stream
//! back into messages.

use super::wire::ComposeError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Prefixes a message with its length.
///
/// Fails if the message is longer than 65535 octets.
pub fn frame(msg: &[u8]) -> Result<Bytes, ComposeError> {
    let len = u16::try_from(msg.len()).map_err(|_| ComposeError::LongData)?;
    let mut res = BytesMut::with_capacity(msg.len() + 2);
    res.put_u16(len);
    res.put_slice(msg);
    Ok(res.freeze())
}

//------------ StreamDecoder -------------------------------------------------

/// Collects octets read from a stream and produces complete messages.
#[derive(Clone, Debug, Default)]
pub struct StreamDecoder {
    buf: BytesMut,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds octets read from the stream.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data)
    }

    /// Returns the next complete message if there is one.
    ///
    /// The returned octets do not include the length prefix.
    pub fn next_message(&mut self) -> Option<Bytes> {
        if self.buf.len() < 2 {
            return None;
        }
        let len = usize::from(u16::from_be_bytes([self.buf[0], self.buf[1]]));
        if self.buf.len() < len + 2 {
            return None;
        }
        self.buf.advance(2);
        Some(self.buf.split_to(len).freeze())
    }

    /// Returns the number of octets waiting for the rest of their message.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

//============ Testing =======================================================
