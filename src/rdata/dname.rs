//! Record data from [RFC 6672]: DNAME records.
//!
//! [RFC 6672]: https://tools.ietf.org/html/rfc6672

use super::{compose_name, RecordData};
use crate::base::iana::Rtype;
use crate::base::name::{Compressor, Name, NameError};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{Parse, ParseError};
use bytes::BytesMut;
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;

//------------ Dname --------------------------------------------------------

name_type! {
    /// DNAME record data.
    ///
    /// The DNAME record provides redirection for a subtree of the domain
    /// name tree in the DNS.
    ///
    /// The DNAME type is defined in RFC 6672. Its target must not be
    /// compressed.
    (Dname, Dname, dname, false)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::check_round_trip;

    #[test]
    fn uncompressed() {
        let name = Name::from_str("example.com.").unwrap();
        let mut compressor = Compressor::new();
        let mut buf = BytesMut::new();
        name.compose_compressed(&mut buf, &mut compressor);
        let len = buf.len();
        Dname::new(name.clone())
            .compose_rdata(&mut buf, Some(&mut compressor));
        assert_eq!(buf.len(), 2 * len);
        check_round_trip(&Dname::new(name).into());
    }
}
