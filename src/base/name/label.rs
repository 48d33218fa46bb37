//! Labels, the dot-separated parts of a domain name.

use core::{cmp, fmt, hash, mem};

//------------ Label ---------------------------------------------------------

/// The content of a single label without its length octet.
///
/// A label holds between zero and 63 octets. Only the root label is empty.
/// Equality, ordering, and hashing all ignore ASCII case, and the ordering
/// is the canonical label order of RFC 4034, section 6.1.
#[repr(transparent)]
pub struct Label([u8]);

impl Label {
    /// The longest possible label.
    pub const MAX_LEN: usize = 63;

    /// # Safety
    ///
    /// `octets` must be no longer than [`Label::MAX_LEN`].
    unsafe fn from_slice_unchecked(octets: &[u8]) -> &Self {
        // SAFETY: Label is a transparent wrapper around [u8].
        mem::transmute(octets)
    }

    /// Wraps a slice as a label if it isn’t too long.
    #[must_use]
    pub fn from_slice(octets: &[u8]) -> Option<&Self> {
        (octets.len() <= Label::MAX_LEN)
            .then(|| unsafe { Self::from_slice_unchecked(octets) })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether this is the empty label ending an absolute name.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// Returns whether this is the single asterisk label.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0 == *b"*"
    }

    /// Returns the number of octets the label takes up on the wire.
    #[must_use]
    pub fn compose_len(&self) -> usize {
        self.len() + 1
    }

    fn lowercase(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().map(u8::to_ascii_lowercase)
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.lowercase().cmp(other.lowercase())
    }
}

impl hash::Hash for Label {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        // The length keeps "a" + "bc" apart from "ab" + "c".
        state.write_u8(self.len() as u8);
        self.lowercase().for_each(|ch| state.write_u8(ch));
    }
}

/// Prints the label in presentation format.
///
/// Octets with a special meaning in zone files are escaped with a
/// backslash, unprintable ones as a decimal `\DDD` escape.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &ch in &self.0 {
            match ch {
                b' ' | b'.' | b'\\' | b'"' | b';' | b'(' | b')' | b'@'
                | b'$' => write!(f, "\\{}", ch as char)?,
                0x21..=0x7E => write!(f, "{}", ch as char)?,
                _ => write!(f, "\\{:03}", ch)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Label({})", self)
    }
}

//------------ LabelIter -----------------------------------------------------

/// Walks the labels of a name in uncompressed wire format.
///
/// An absolute name ends with the root label.
#[derive(Clone, Debug)]
pub struct LabelIter<'a> {
    rest: &'a [u8],
}

impl<'a> LabelIter<'a> {
    /// The slice has to hold a valid uncompressed name.
    pub(super) fn new(rest: &'a [u8]) -> Self {
        LabelIter { rest }
    }
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, tail) = self.rest.split_first()?;
        let len = usize::from(len);
        if len > tail.len() {
            self.rest = &[];
            return None;
        }
        let (label, tail) = tail.split_at(len);
        self.rest = tail;
        Label::from_slice(label)
    }
}

//============ Tests =========================================================
