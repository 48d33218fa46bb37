//! IPv6 addresses in the DNS.

use super::RecordData;
use crate::base::iana::Rtype;
use crate::base::name::Compressor;
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::ParseError;
use bytes::{BufMut, BytesMut};
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;
use std::net::Ipv6Addr;

//------------ Aaaa ----------------------------------------------------------

/// The data of an AAAA record, a single IPv6 address.
///
/// Defined in RFC 3596.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Aaaa {
    addr: Ipv6Addr,
}

impl Aaaa {
    #[must_use]
    pub fn new(addr: Ipv6Addr) -> Aaaa {
        Aaaa { addr }
    }

    #[must_use]
    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }
}

impl From<Ipv6Addr> for Aaaa {
    fn from(addr: Ipv6Addr) -> Self {
        Aaaa { addr }
    }
}

impl FromStr for Aaaa {
    type Err = <Ipv6Addr as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv6Addr::from_str(s).map(Aaaa::new)
    }
}

//--- RecordData

impl RecordData for Aaaa {
    const RTYPE: Rtype = Rtype::Aaaa;

    fn parse_rdata(
        parser: &mut Parser<[u8]>,
        _rdlen: usize,
    ) -> Result<Self, ParseError> {
        let mut octets = [0u8; 16];
        parser.parse_buf(&mut octets)?;
        Ok(Ipv6Addr::from(octets).into())
    }

    fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let token = scanner.scan_str()?;
        token.parse().map_err(|_| {
            ScanError::custom(format!("'{}' is not an IPv6 address", token))
        })
    }

    fn compose_rdata(&self, target: &mut BytesMut, _: Option<&mut Compressor>) {
        target.put_slice(&self.addr.octets())
    }
}

impl fmt::Display for Aaaa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.addr, f)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::test::check_round_trip;

    #[test]
    fn aaaa_round_trip() {
        check_round_trip(&Aaaa::from_str("2001:db8::1").unwrap().into());
        assert!(Aaaa::from_str("192.0.2.1").is_err());
    }
}
