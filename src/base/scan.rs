//! Parsing of data from its representation format.
//!
//! The representation format of DNS data, best known from zone files, is
//! a sequence of entries made of whitespace separated tokens. An entry
//! normally ends at the end of a line but can be continued across lines by
//! wrapping parts of it in parentheses. Tokens can be quoted to include
//! whitespace, and a semicolon starts a comment reaching to the end of the
//! line.
//!
//! This module splits text into [`Entry`]s of [`Token`]s via [`entries`]
//! and provides the [`Scanner`] for turning the tokens of an entry into
//! values. Tokens keep their escape sequences, since the meaning of an
//! escaped dot depends on whether the token is a domain name or a
//! character string.

use super::iana::{Class, Rtype};
use super::name::{Name, NameError};
use bytes::Bytes;
use core::fmt;
use core::str::FromStr;

//------------ Token ---------------------------------------------------------

/// A single token of an entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    /// Returns the raw text of the token including any escape sequences.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns whether the token was enclosed in quotes.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Returns the octets of the token with all escape sequences resolved.
    pub fn unescape(&self) -> Result<Vec<u8>, ScanError> {
        let mut res = Vec::with_capacity(self.text.len());
        let mut chars = self.text.bytes();
        while let Some(ch) = chars.next() {
            if ch != b'\\' {
                res.push(ch);
                continue;
            }
            let ch = chars
                .next()
                .ok_or_else(|| ScanError::custom("incomplete escape"))?;
            if ch.is_ascii_digit() {
                let mut value = u32::from(ch - b'0');
                for _ in 0..2 {
                    match chars.next() {
                        Some(ch) if ch.is_ascii_digit() => {
                            value = value * 10 + u32::from(ch - b'0');
                        }
                        _ => return Err(ScanError::custom("bad escape")),
                    }
                }
                res.push(
                    u8::try_from(value)
                        .map_err(|_| ScanError::custom("bad escape"))?,
                );
            } else {
                res.push(ch);
            }
        }
        Ok(res)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

//------------ Entry ---------------------------------------------------------

/// An entry of representation format data.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    /// The tokens of the entry.
    pub tokens: Vec<Token>,

    /// Whether the entry started with whitespace.
    ///
    /// In zone files, such an entry has no owner name and uses the owner
    /// of the previous entry.
    pub blank_owner: bool,

    /// The line number the entry started on, starting at 1.
    pub line: usize,
}

//------------ entries -------------------------------------------------------

/// Splits text into entries.
///
/// Empty entries, i.e., lines that only contain whitespace or comments, are
/// skipped.
pub fn entries(text: &str) -> Result<Vec<Entry>, ScanError> {
    let mut res = Vec::new();
    let mut entry = Entry {
        line: 1,
        ..Default::default()
    };
    let mut token: Option<Token> = None;
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut line = 1;
    let mut line_start = true;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        let at_line_start = line_start;
        line_start = false;

        if in_quote {
            let tok = token.get_or_insert_with(|| Token {
                text: String::new(),
                quoted: true,
            });
            match ch {
                '"' => {
                    in_quote = false;
                    if let Some(tok) = token.take() {
                        entry.tokens.push(tok);
                    }
                }
                '\\' => {
                    tok.text.push(ch);
                    if let Some(next) = chars.next() {
                        tok.text.push(next);
                    }
                }
                '\n' => {
                    return Err(ScanError::custom("unterminated quoted string")
                        .at_line(line))
                }
                _ => tok.text.push(ch),
            }
            continue;
        }

        match ch {
            '\n' => {
                end_token(&mut token, &mut entry);
                line += 1;
                line_start = true;
                if depth == 0 {
                    finish_entry(&mut entry, &mut res, line);
                }
            }
            ' ' | '\t' | '\r' => {
                if at_line_start && depth == 0 && entry.tokens.is_empty() {
                    entry.blank_owner = true;
                }
                end_token(&mut token, &mut entry);
            }
            ';' => {
                end_token(&mut token, &mut entry);
                // Skip to the end of the line but keep the line feed.
                let rest = chars.as_str();
                let skip = rest.find('\n').unwrap_or(rest.len());
                chars = rest[skip..].chars();
            }
            '(' => {
                end_token(&mut token, &mut entry);
                depth += 1;
            }
            ')' => {
                end_token(&mut token, &mut entry);
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ScanError::custom("unbalanced parentheses").at_line(line)
                })?;
            }
            '"' => {
                end_token(&mut token, &mut entry);
                in_quote = true;
                token = Some(Token {
                    text: String::new(),
                    quoted: true,
                });
            }
            '\\' => {
                let tok = token.get_or_insert_with(Default::default);
                tok.text.push(ch);
                if let Some(next) = chars.next() {
                    tok.text.push(next);
                }
            }
            _ => {
                token.get_or_insert_with(Default::default).text.push(ch);
            }
        }
    }
    if in_quote {
        return Err(ScanError::custom("unterminated quoted string").at_line(line));
    }
    if depth > 0 {
        return Err(ScanError::custom("unbalanced parentheses").at_line(line));
    }
    end_token(&mut token, &mut entry);
    finish_entry(&mut entry, &mut res, line);
    Ok(res)
}

impl Default for Token {
    fn default() -> Self {
        Token {
            text: String::new(),
            quoted: false,
        }
    }
}

fn end_token(token: &mut Option<Token>, entry: &mut Entry) {
    if let Some(tok) = token.take() {
        entry.tokens.push(tok)
    }
}

fn finish_entry(entry: &mut Entry, res: &mut Vec<Entry>, next_line: usize) {
    let next = Entry {
        line: next_line,
        ..Default::default()
    };
    let done = core::mem::replace(entry, next);
    if !done.tokens.is_empty() {
        res.push(done)
    }
}

//------------ Scanner -------------------------------------------------------

/// A scanner for the tokens of a single entry.
///
/// Relative domain names are completed with the scanner’s origin. Without
/// an origin, they are rejected.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    tokens: &'a [Token],
    pos: usize,
    origin: Option<&'a Name>,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for the given tokens.
    #[must_use]
    pub fn new(tokens: &'a [Token], origin: Option<&'a Name>) -> Self {
        Scanner {
            tokens,
            pos: 0,
            origin,
        }
    }

    /// Returns whether all tokens have been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes the next token.
    pub fn scan_token(&mut self) -> Result<&'a Token, ScanError> {
        let res = self
            .peek()
            .ok_or_else(|| ScanError::custom("unexpected end of entry"))?;
        self.pos += 1;
        Ok(res)
    }

    /// Consumes the next token and returns its raw text.
    pub fn scan_str(&mut self) -> Result<&'a str, ScanError> {
        self.scan_token().map(Token::as_str)
    }

    /// Scans a value of a type implementing [`Scan`].
    pub fn scan<T: Scan>(&mut self) -> Result<T, ScanError> {
        T::scan(self)
    }

    /// Scans an absolute domain name.
    ///
    /// The name `@` stands for the origin.
    pub fn scan_name(&mut self) -> Result<Name, ScanError> {
        let token = self.scan_str()?;
        if token == "@" {
            return self
                .origin
                .cloned()
                .ok_or_else(|| NameError::RelativeName.into());
        }
        let name = Name::from_str(token)?;
        if name.is_absolute() {
            return Ok(name);
        }
        match self.origin {
            Some(origin) => Ok(name.concat(origin)?),
            None => Err(NameError::RelativeName.into()),
        }
    }

    /// Scans a character string of at most 255 octets.
    pub fn scan_charstr(&mut self) -> Result<Bytes, ScanError> {
        let res = self.scan_token()?.unescape()?;
        if res.len() > 255 {
            return Err(ScanError::custom("character string too long"));
        }
        Ok(res.into())
    }

    /// Scans a TTL value.
    ///
    /// Besides plain seconds, this accepts values with unit suffixes such as
    /// `1h30m`.
    pub fn scan_ttl(&mut self) -> Result<u32, ScanError> {
        parse_ttl(self.scan_str()?)
    }

    /// Concatenates the text of all remaining tokens.
    ///
    /// This is used for encoded binary data which may be split into
    /// several tokens.
    pub fn scan_remaining(&mut self) -> String {
        let mut res = String::new();
        while let Some(token) = self.peek() {
            res.push_str(token.as_str());
            self.pos += 1;
        }
        res
    }

    /// Scans the optional TTL and class and the record type of a record.
    ///
    /// TTL and class may appear in either order.
    pub fn scan_record_header(
        &mut self,
    ) -> Result<(Option<u32>, Option<Class>, Rtype), ScanError> {
        let mut ttl = None;
        let mut class = None;
        loop {
            let token = self.scan_str()?;
            if class.is_none() {
                if let Ok(value) = Class::from_str(token) {
                    class = Some(value);
                    continue;
                }
            }
            if ttl.is_none()
                && token.as_bytes().first().map_or(false, u8::is_ascii_digit)
            {
                ttl = Some(parse_ttl(token)?);
                continue;
            }
            let rtype = Rtype::from_str(token).map_err(|_| {
                ScanError::custom(format!("unknown record type '{}'", token))
            })?;
            return Ok((ttl, class, rtype));
        }
    }

    /// Checks that all tokens have been consumed.
    pub fn finish(&self) -> Result<(), ScanError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ScanError::custom(format!(
                "trailing data '{}'",
                token
            ))),
        }
    }
}

/// Parses a TTL value with optional unit suffixes.
pub fn parse_ttl(s: &str) -> Result<u32, ScanError> {
    if let Ok(res) = s.parse::<u32>() {
        return Ok(res);
    }
    let err = || ScanError::custom(format!("invalid TTL '{}'", s));
    let mut res = 0u32;
    let mut value = 0u32;
    let mut digits = false;
    for ch in s.chars() {
        if let Some(digit) = ch.to_digit(10) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(err)?;
            digits = true;
            continue;
        }
        let unit = match ch.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86400,
            'w' => 604_800,
            _ => return Err(err()),
        };
        if !digits {
            return Err(err());
        }
        res = value
            .checked_mul(unit)
            .and_then(|v| res.checked_add(v))
            .ok_or_else(err)?;
        value = 0;
        digits = false;
    }
    if digits || s.is_empty() {
        return Err(err());
    }
    Ok(res)
}

//------------ Scan ----------------------------------------------------------

/// A type that can be scanned from its representation format.
pub trait Scan: Sized {
    /// Scans a value from the next token or tokens of the scanner.
    fn scan(scanner: &mut Scanner) -> Result<Self, ScanError>;
}

macro_rules! impl_scan_unsigned {
    ( $type:ident) => {
        impl Scan for $type {
            fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
                let token = scanner.scan_str()?;
                token.parse().map_err(|_| {
                    ScanError::custom(format!(
                        "expected decimal number, got '{}'",
                        token
                    ))
                })
            }
        }
    };
}

impl_scan_unsigned!(u8);
impl_scan_unsigned!(u16);
impl_scan_unsigned!(u32);

impl Scan for Name {
    fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        scanner.scan_name()
    }
}

//------------ ScanError -----------------------------------------------------

/// An error happened while scanning representation format data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanError {
    msg: String,
    line: Option<usize>,
}

impl ScanError {
    /// Creates a new error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        ScanError {
            msg: msg.into(),
            line: None,
        }
    }

    /// Attaches the line number the error happened on.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    /// Returns the line the error happened on if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl From<NameError> for ScanError {
    fn from(err: NameError) -> Self {
        ScanError::custom(err.to_string())
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.msg),
            None => f.write_str(&self.msg),
        }
    }
}

impl std::error::Error for ScanError {}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn texts(entry: &Entry) -> Vec<&str> {
        entry.tokens.iter().map(Token::as_str).collect()
    }

    #[test]
    fn split_entries() {
        let res = entries(
            "$ORIGIN example.com.\n\
             @ 3600 IN SOA ns hostmaster ( 1 ; serial\n\
               7200 900 1209600 300 )\n\
             \n\
             ; comment only\n\
             \tTXT \"a b\" c\\ d\n",
        )
        .unwrap();
        assert_eq!(res.len(), 3);
        assert_eq!(texts(&res[0]), ["$ORIGIN", "example.com."]);
        assert_eq!(
            texts(&res[1]),
            [
                "@", "3600", "IN", "SOA", "ns", "hostmaster", "1", "7200",
                "900", "1209600", "300"
            ]
        );
        assert_eq!(res[1].line, 2);
        assert!(!res[1].blank_owner);
        assert_eq!(texts(&res[2]), ["TXT", "a b", "c\\ d"]);
        assert!(res[2].blank_owner);
        assert!(res[2].tokens[1].is_quoted());
        assert_eq!(res[2].line, 6);
    }

    #[test]
    fn bad_entries() {
        assert!(entries("a ( b\n").is_err());
        assert!(entries("a ) b\n").is_err());
        assert!(entries("a \"b\n").is_err());
    }

    #[test]
    fn unescape() {
        let res = entries("a\\065\\.b \"x\\\"y\"").unwrap();
        assert_eq!(res[0].tokens[0].unescape().unwrap(), b"aA.b");
        assert_eq!(res[0].tokens[1].unescape().unwrap(), b"x\"y");
    }

    #[test]
    fn ttl() {
        assert_eq!(parse_ttl("3600"), Ok(3600));
        assert_eq!(parse_ttl("1h30m"), Ok(5400));
        assert_eq!(parse_ttl("1W"), Ok(604_800));
        assert!(parse_ttl("1x").is_err());
        assert!(parse_ttl("h").is_err());
        assert!(parse_ttl("").is_err());
    }

    #[test]
    fn names() {
        let origin = Name::from_str("example.com.").unwrap();
        let res = entries("www @ mail.example.net.").unwrap();
        let mut scanner = Scanner::new(&res[0].tokens, Some(&origin));
        assert_eq!(
            scanner.scan_name().unwrap(),
            Name::from_str("www.example.com.").unwrap()
        );
        assert_eq!(scanner.scan_name().unwrap(), origin);
        assert_eq!(
            scanner.scan_name().unwrap(),
            Name::from_str("mail.example.net.").unwrap()
        );
        assert!(scanner.finish().is_ok());

        let mut scanner = Scanner::new(&res[0].tokens, None);
        assert!(scanner.scan_name().is_err());
    }

    #[test]
    fn record_header() {
        let res = entries("IN 300 MX").unwrap();
        let mut scanner = Scanner::new(&res[0].tokens, None);
        assert_eq!(
            scanner.scan_record_header().unwrap(),
            (Some(300), Some(Class::In), Rtype::Mx)
        );
        let res = entries("A").unwrap();
        let mut scanner = Scanner::new(&res[0].tokens, None);
        assert_eq!(
            scanner.scan_record_header().unwrap(),
            (None, None, Rtype::A)
        );
    }
}
