//! Domain name compression.

use super::Name;
use bytes::{BufMut, Bytes, BytesMut};

//------------ Compressor ----------------------------------------------------

/// A domain name compressor.
///
/// The compressor remembers the position of every name suffix it has
/// written so far. When asked to write another name, it looks for the
/// longest suffix of that name that has already been written and replaces
/// it with a compression pointer to that position.
///
/// Suffixes are kept in a fixed number of buckets selected by a hash of
/// the suffix. Lookup within a bucket walks it from the most recently added
/// entry, so the most recent position wins if a suffix was registered more
/// than once.
///
/// The positions are relative to the beginning of the buffer the names are
/// written to. That buffer must therefore contain the message only,
/// starting with its header. Because pointers only have 14 bits, positions
/// beyond 0x3FFF are never registered.
///
/// A compressor is meant to be used for building a single message and
/// dropped afterwards.
#[derive(Clone, Debug)]
pub struct Compressor {
    buckets: [Vec<(Bytes, u16)>; Compressor::BUCKETS],
    case_sensitive: bool,
}

impl Compressor {
    const BUCKETS: usize = 17;

    /// The largest position a compression pointer can point to.
    pub const MAX_POINTER: usize = 0x3FFF;

    /// Creates a new compressor that compares names ignoring case.
    #[must_use]
    pub fn new() -> Self {
        Compressor {
            buckets: Default::default(),
            case_sensitive: false,
        }
    }

    /// Creates a new compressor that only reuses names with identical case.
    #[must_use]
    pub fn case_sensitive() -> Self {
        Compressor {
            buckets: Default::default(),
            case_sensitive: true,
        }
    }

    fn bucket(&self, suffix: &[u8]) -> usize {
        let hash = suffix.iter().fold(0usize, |hash, &ch| {
            let ch = if self.case_sensitive {
                ch
            } else {
                ch.to_ascii_lowercase()
            };
            hash.wrapping_mul(31).wrapping_add(usize::from(ch))
        });
        hash % Self::BUCKETS
    }

    /// Returns the position of a previously written suffix.
    #[must_use]
    pub fn get(&self, suffix: &[u8]) -> Option<u16> {
        self.buckets[self.bucket(suffix)]
            .iter()
            .rev()
            .find(|(name, _)| {
                if self.case_sensitive {
                    name.as_ref() == suffix
                } else {
                    name.eq_ignore_ascii_case(suffix)
                }
            })
            .map(|(_, pos)| *pos)
    }

    /// Registers a suffix written at the given position.
    ///
    /// Positions beyond the pointer range are silently ignored.
    pub fn add(&mut self, suffix: Bytes, pos: usize) {
        if pos > Self::MAX_POINTER {
            return;
        }
        let bucket = self.bucket(suffix.as_ref());
        self.buckets[bucket].push((suffix, pos as u16));
    }

    /// Forgets all positions at or after `len`.
    ///
    /// This needs to be called whenever the target buffer is truncated.
    pub fn truncate(&mut self, len: usize) {
        for bucket in &mut self.buckets {
            bucket.retain(|(_, pos)| usize::from(*pos) < len)
        }
    }

    /// Returns the number of registered suffixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Returns whether no suffixes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a name to `target` compressing it if possible.
    ///
    /// Each suffix of the name is looked up in turn, starting with the
    /// complete name. The first suffix found is replaced with a pointer.
    /// Every suffix written out in full is registered.
    pub fn compose_name(&mut self, name: &Name, target: &mut BytesMut) {
        let octets = name.as_octets();
        let mut start = 0;
        for label in name.iter_labels() {
            if label.is_root() {
                target.put_u8(0);
                return;
            }
            let suffix = octets.slice(start..);
            if let Some(pos) = self.get(suffix.as_ref()) {
                target.put_u16(0xC000 | pos);
                return;
            }
            self.add(suffix, target.len());
            target.put_u8(label.len() as u8);
            target.put_slice(label.as_slice());
            start += label.compose_len();
        }
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

//============ Tests =========================================================
