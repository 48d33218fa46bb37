//! Registered DNS parameters.
//!
//! Each type here is an enum with a variant per value registered with IANA
//! plus an `Unknown` variant for any other integer. A value always equals
//! its integer, whichever variant carries it, so `Rtype::A` and
//! `Rtype::Unknown(1)` are the same.
//!
//! Text conversion uses the registered mnemonic where one exists and
//! falls back to a generic form such as `TYPE65` or `CLASS3` otherwise.
//! Parsing accepts both, ignoring case.

#[macro_use]
mod macros;

pub mod class;
pub mod opcode;
pub mod rcode;
pub mod rtype;

pub use self::class::Class;
pub use self::opcode::Opcode;
pub use self::rcode::{Rcode, TsigRcode};
pub use self::rtype::Rtype;

use core::fmt;

//------------ FromStrError --------------------------------------------------

/// A string could not be converted into an IANA value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FromStrError(pub(crate) &'static str);

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FromStrError {}
