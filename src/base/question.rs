//! A single question in a DNS message.

use super::iana::{Class, Rtype};
use super::name::{Compressor, Name};
use super::wire::{Parse, ParseError};
use bytes::{BufMut, BytesMut};
use core::fmt;
use octseq::parse::Parser;

//------------ Question ------------------------------------------------------

/// What a query asks for: a name, a record type, and a class.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    qname: Name,
    qtype: Rtype,
    qclass: Class,
}

impl Question {
    #[must_use]
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a question for class IN.
    #[must_use]
    pub fn new_in(qname: Name, qtype: Rtype) -> Self {
        Self::new(qname, qtype, Class::In)
    }

    #[must_use]
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    #[must_use]
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    #[must_use]
    pub fn qclass(&self) -> Class {
        self.qclass
    }
}

impl Question {
    /// Appends the wire format of the question.
    ///
    /// The question name is compressed if a compressor is given.
    pub fn compose(
        &self,
        target: &mut BytesMut,
        compressor: Option<&mut Compressor>,
    ) {
        match compressor {
            Some(compressor) => {
                self.qname.compose_compressed(target, compressor)
            }
            None => self.qname.compose(target),
        }
        target.put_u16(self.qtype.to_int());
        target.put_u16(self.qclass.to_int());
    }
}

impl Parse for Question {
    fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        Ok(Question::new(
            Name::parse(parser)?,
            parser.parse_u16_be()?.into(),
            parser.parse_u16_be()?.into(),
        ))
    }
}

impl From<(Name, Rtype, Class)> for Question {
    fn from((name, rtype, class): (Name, Rtype, Class)) -> Self {
        Question::new(name, rtype, class)
    }
}

impl From<(Name, Rtype)> for Question {
    fn from((name, rtype): (Name, Rtype)) -> Self {
        Question::new_in(name, rtype)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname, self.qclass, self.qtype)
    }
}

//============ Tests =========================================================
