//! Domain names.
//!
//! This module provides the [`Name`] type, an immutable domain name kept in
//! its uncompressed wire format, together with the [`Label`] type for the
//! individual labels and the [`Compressor`] used for name compression when
//! building messages.
//!
//! Names can be absolute, in which case their last label is the empty root
//! label, or relative. Only absolute names can appear in messages. Relative
//! names exist for the representation format where they are completed by
//! an origin.
//!
//! Comparing and hashing names ignores ASCII case, as does the ordering
//! which is the canonical ordering defined in section 6.1 of [RFC 4034].
//! This makes `Name` usable as the key of a sorted map that iterates in
//! canonical order.
//!
//! [RFC 4034]: https://tools.ietf.org/html/rfc4034

pub use self::compress::Compressor;
pub use self::label::{Label, LabelIter};

mod compress;
mod label;

use super::wire::{Parse, ParseError};
use bytes::{BufMut, Bytes, BytesMut};
use core::str::FromStr;
use core::{cmp, fmt, hash};
use octseq::parse::Parser;
use smallvec::SmallVec;

//------------ Name ----------------------------------------------------------

/// A domain name.
///
/// The name is kept as a [`Bytes`] value containing its uncompressed wire
/// format. Cloning a name is therefore cheap.
#[derive(Clone)]
pub struct Name {
    octets: Bytes,
}

/// # Creation
///
impl Name {
    /// The maximum length of a domain name in wire format.
    pub const MAX_LEN: usize = 255;

    /// Creates a name from octets that are known to be a valid name.
    fn from_octets_unchecked(octets: Bytes) -> Self {
        Name { octets }
    }

    /// Returns the root name.
    #[must_use]
    pub fn root() -> Self {
        Self::from_octets_unchecked(Bytes::from_static(b"\0"))
    }

    /// Creates a name from static octets that are known to be valid.
    pub(crate) fn from_static_wire(octets: &'static [u8]) -> Self {
        Self::from_octets_unchecked(Bytes::from_static(octets))
    }

    /// Returns the empty relative name.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_octets_unchecked(Bytes::new())
    }

    /// Creates a name from its uncompressed wire format.
    ///
    /// The slice must contain exactly one name. It may either be absolute
    /// or relative.
    pub fn from_slice(slice: &[u8]) -> Result<Self, NameError> {
        if slice.len() > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        let mut pos = 0;
        while pos < slice.len() {
            let len = usize::from(slice[pos]);
            if len > Label::MAX_LEN {
                return Err(NameError::LongLabel);
            }
            if len == 0 {
                if pos + 1 != slice.len() {
                    return Err(NameError::EmptyLabel);
                }
                break;
            }
            pos += len + 1;
        }
        if pos > slice.len() {
            return Err(NameError::ShortInput);
        }
        Ok(Self::from_octets_unchecked(Bytes::copy_from_slice(slice)))
    }

    /// Parses a possibly compressed name from the beginning of a message.
    ///
    /// This is a shortcut for parsing from a fresh parser over `msg`.
    pub fn from_wire(msg: &[u8]) -> Result<Self, ParseError> {
        Self::parse(&mut Parser::from_ref(msg))
    }
}

/// # Properties
///
impl Name {
    /// Returns a reference to the uncompressed wire format of the name.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.octets.as_ref()
    }

    /// Returns the underlying octets.
    #[must_use]
    pub fn as_octets(&self) -> &Bytes {
        &self.octets
    }

    /// Returns the length of the uncompressed wire format.
    #[must_use]
    pub fn compose_len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether the name is absolute.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.iter_labels().last().map_or(false, Label::is_root)
    }

    /// Returns whether the name is the root name.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.octets.as_ref() == b"\0"
    }

    /// Returns whether the name is the empty relative name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns whether the first label of the name is the wildcard label.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.first_label().map_or(false, Label::is_wildcard)
    }

    /// Returns the number of labels in the name.
    ///
    /// The root label of an absolute name is counted, so the root name
    /// has one label.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.iter_labels().count()
    }

    /// Returns an iterator over the labels of the name.
    pub fn iter_labels(&self) -> LabelIter<'_> {
        LabelIter::new(self.as_slice())
    }

    /// Returns the first label of the name.
    ///
    /// Returns `None` only for the empty relative name.
    #[must_use]
    pub fn first_label(&self) -> Option<&Label> {
        self.iter_labels().next()
    }

    /// Returns the start positions of all labels in the wire format.
    fn label_starts(&self) -> SmallVec<[usize; 16]> {
        let mut res = SmallVec::new();
        let mut pos = 0;
        for label in self.iter_labels() {
            res.push(pos);
            pos += label.compose_len();
        }
        res
    }

    /// Returns whether `self` is equal to or below `base`.
    #[must_use]
    pub fn is_subdomain(&self, base: &Name) -> bool {
        if base.is_empty() {
            return true;
        }
        let base = base.as_slice();
        self.label_starts()
            .into_iter()
            .map(|start| &self.as_slice()[start..])
            .any(|suffix| suffix.eq_ignore_ascii_case(base))
    }

    /// Compares two names including the case of ASCII letters.
    #[must_use]
    pub fn eq_case_sensitive(&self, other: &Name) -> bool {
        self.octets == other.octets
    }
}

/// # Deriving Names
///
impl Name {
    /// Returns the name with the first `n` labels removed.
    ///
    /// Returns `None` if the name doesn’t have enough labels. An absolute
    /// name cannot lose its root label.
    #[must_use]
    pub fn strip_labels(&self, n: usize) -> Option<Name> {
        if n == 0 {
            return Some(self.clone());
        }
        let starts = self.label_starts();
        let max = if self.is_absolute() {
            starts.len() - 1
        } else {
            starts.len()
        };
        match n.cmp(&max) {
            cmp::Ordering::Greater => None,
            cmp::Ordering::Equal if !self.is_absolute() => Some(Name::empty()),
            _ => Some(Self::from_octets_unchecked(
                self.octets.slice(starts[n]..),
            )),
        }
    }

    /// Returns the parent of the name.
    ///
    /// Returns `None` for the root name and the empty relative name.
    #[must_use]
    pub fn parent(&self) -> Option<Name> {
        if self.is_root() || self.is_empty() {
            None
        } else {
            self.strip_labels(1)
        }
    }

    /// Returns the name with the first `n` labels replaced by a wildcard.
    #[must_use]
    pub fn wildcard(&self, n: usize) -> Option<Name> {
        self.strip_labels(n)?.prepend(b"*").ok()
    }

    /// Returns a new name with the given label added to the front.
    pub fn prepend(&self, label: &[u8]) -> Result<Name, NameError> {
        if label.is_empty() {
            return Err(NameError::EmptyLabel);
        }
        if label.len() > Label::MAX_LEN {
            return Err(NameError::LongLabel);
        }
        let len = self.octets.len() + label.len() + 1;
        if len > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        let mut res = BytesMut::with_capacity(len);
        res.put_u8(label.len() as u8);
        res.put_slice(label);
        res.put_slice(self.as_slice());
        Ok(Self::from_octets_unchecked(res.freeze()))
    }

    /// Appends `origin` to a relative name.
    ///
    /// If `self` already is absolute, it is returned unchanged.
    pub fn concat(&self, origin: &Name) -> Result<Name, NameError> {
        if self.is_absolute() {
            return Ok(self.clone());
        }
        let len = self.octets.len() + origin.octets.len();
        if len > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        let mut res = BytesMut::with_capacity(len);
        res.put_slice(self.as_slice());
        res.put_slice(origin.as_slice());
        Ok(Self::from_octets_unchecked(res.freeze()))
    }

    /// Returns the relative part of the name below `origin`.
    ///
    /// Returns `None` if the name isn’t below `origin`. If the name is
    /// equal to `origin`, the empty relative name is returned.
    #[must_use]
    pub fn relativize(&self, origin: &Name) -> Option<Name> {
        if !self.is_subdomain(origin) {
            return None;
        }
        let len = self.octets.len() - origin.octets.len();
        Some(Self::from_octets_unchecked(self.octets.slice(..len)))
    }

    /// Replaces the suffix `old` of the name with `new`.
    ///
    /// This is the name substitution performed for DNAME records.
    pub fn replace_suffix(
        &self,
        old: &Name,
        new: &Name,
    ) -> Result<Name, NameError> {
        self.relativize(old)
            .ok_or(NameError::NotSubdomain)?
            .concat(new)
    }

    /// Returns the name with all ASCII letters converted to lowercase.
    #[must_use]
    pub fn to_canonical(&self) -> Name {
        Self::from_octets_unchecked(Bytes::from(
            self.octets.to_ascii_lowercase(),
        ))
    }
}

/// # Composing
///
impl Name {
    /// Appends the uncompressed wire format of the name.
    pub fn compose(&self, target: &mut BytesMut) {
        target.put_slice(self.as_slice())
    }

    /// Appends the canonical wire format of the name.
    ///
    /// The canonical format is uncompressed with all ASCII letters
    /// converted to lowercase.
    pub fn compose_canonical(&self, target: &mut BytesMut) {
        target.extend(self.octets.iter().map(u8::to_ascii_lowercase))
    }

    /// Appends the name using the compressor.
    pub fn compose_compressed(
        &self,
        target: &mut BytesMut,
        compressor: &mut Compressor,
    ) {
        compressor.compose_name(self, target)
    }
}

//--- Parse

impl Parse for Name {
    /// Parses a possibly compressed name.
    ///
    /// Compression pointers must point strictly backwards. Each pointer has
    /// to point to a position before the label sequence it was found in,
    /// which rules out loops.
    fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        let msg = parser.octets_ref();
        let mut res = BytesMut::with_capacity(32);
        let mut pos = parser.pos();
        let mut limit = pos;
        let mut end = None;
        loop {
            let ltype = *msg.get(pos).ok_or(ParseError::ShortInput)?;
            match ltype & 0xC0 {
                0x00 => {
                    let len = usize::from(ltype);
                    let label = msg
                        .get(pos + 1..pos + 1 + len)
                        .ok_or(ParseError::ShortInput)?;
                    if res.len() + len + 1 > Self::MAX_LEN {
                        return Err(ParseError::form_error("long domain name"));
                    }
                    res.put_u8(ltype);
                    res.put_slice(label);
                    pos += len + 1;
                    if len == 0 {
                        break;
                    }
                }
                0xC0 => {
                    let low = *msg.get(pos + 1).ok_or(ParseError::ShortInput)?;
                    let target =
                        (usize::from(ltype & 0x3F) << 8) | usize::from(low);
                    if end.is_none() {
                        end = Some(pos + 2);
                    }
                    if target >= limit {
                        return Err(ParseError::form_error(
                            "compression pointer not pointing backwards",
                        ));
                    }
                    limit = target;
                    pos = target;
                }
                _ => {
                    return Err(ParseError::form_error("invalid label type"))
                }
            }
        }
        parser.seek(end.unwrap_or(pos))?;
        Ok(Self::from_octets_unchecked(res.freeze()))
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    /// Parses a name from its presentation format.
    ///
    /// A name ending in a dot is absolute, all others are relative. Labels
    /// can contain escape sequences: a backslash followed by three decimal
    /// digits stands for the octet with that value, a backslash followed
    /// by any other character stands for that character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            return Ok(Name::root());
        }
        if s.is_empty() {
            return Err(NameError::EmptyLabel);
        }
        let mut res = BytesMut::with_capacity(s.len() + 2);
        let mut label: SmallVec<[u8; 64]> = SmallVec::new();
        let mut absolute = false;
        let mut chars = s.bytes();
        while let Some(ch) = chars.next() {
            if absolute {
                // A dot was followed by more characters, i.e., the dot
                // ended a label rather than the name.
                absolute = false;
            }
            match ch {
                b'.' => {
                    push_label(&mut res, &label)?;
                    label.clear();
                    absolute = true;
                }
                b'\\' => {
                    let ch = chars.next().ok_or(NameError::BadEscape)?;
                    if ch.is_ascii_digit() {
                        let d2 = chars.next().ok_or(NameError::BadEscape)?;
                        let d3 = chars.next().ok_or(NameError::BadEscape)?;
                        if !d2.is_ascii_digit() || !d3.is_ascii_digit() {
                            return Err(NameError::BadEscape);
                        }
                        let value = u32::from(ch - b'0') * 100
                            + u32::from(d2 - b'0') * 10
                            + u32::from(d3 - b'0');
                        let value = u8::try_from(value)
                            .map_err(|_| NameError::BadEscape)?;
                        label.push(value);
                    } else {
                        label.push(ch);
                    }
                }
                _ => label.push(ch),
            }
            if label.len() > Label::MAX_LEN {
                return Err(NameError::LongLabel);
            }
        }
        if absolute {
            res.put_u8(0);
        } else {
            push_label(&mut res, &label)?;
        }
        if res.len() > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        Ok(Self::from_octets_unchecked(res.freeze()))
    }
}

fn push_label(target: &mut BytesMut, label: &[u8]) -> Result<(), NameError> {
    if label.is_empty() {
        return Err(NameError::EmptyLabel);
    }
    if target.len() + label.len() + 1 > Name::MAX_LEN {
        return Err(NameError::LongName);
    }
    target.put_u8(label.len() as u8);
    target.put_slice(label);
    Ok(())
}

//--- PartialEq and Eq

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        // Length octets are never ASCII letters, so comparing the whole
        // wire format ignoring case compares the labels ignoring case.
        self.as_slice().eq_ignore_ascii_case(other.as_slice())
    }
}

impl Eq for Name {}

//--- PartialOrd and Ord

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    /// Returns the canonical ordering of two names.
    ///
    /// Names are compared label by label starting from the right. Labels
    /// compare like octet strings ignoring ASCII case. A name that runs out
    /// of labels sorts first.
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        let left: SmallVec<[&Label; 16]> = self.iter_labels().collect();
        let right: SmallVec<[&Label; 16]> = other.iter_labels().collect();
        left.iter().rev().cmp(right.iter().rev())
    }
}

//--- Hash

impl hash::Hash for Name {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for label in self.iter_labels() {
            hash::Hash::hash(label, state)
        }
    }
}

//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        let mut first = true;
        for label in self.iter_labels() {
            if label.is_root() {
                f.write_str(".")?;
            } else {
                if !first {
                    f.write_str(".")?;
                }
                fmt::Display::fmt(label, f)?;
            }
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

//------------ NameError -----------------------------------------------------

/// A domain name could not be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// A label was longer than 63 octets.
    LongLabel,

    /// The name was longer than 255 octets.
    LongName,

    /// An illegal escape sequence was encountered.
    BadEscape,

    /// An empty label was encountered in the middle of a name.
    EmptyLabel,

    /// A relative name was given where an absolute one is required.
    RelativeName,

    /// The name is not below the name it was supposed to be below.
    NotSubdomain,

    /// The wire format ended in the middle of a label.
    ShortInput,
}

//--- Display and Error

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            NameError::LongLabel => "label exceeds 63 octets",
            NameError::LongName => "domain name exceeds 255 octets",
            NameError::BadEscape => "illegal escape sequence",
            NameError::EmptyLabel => "empty label",
            NameError::RelativeName => "relative domain name",
            NameError::NotSubdomain => "name not below base name",
            NameError::ShortInput => "unexpected end of input",
        })
    }
}

impl std::error::Error for NameError {}

//============ Tests =========================================================
