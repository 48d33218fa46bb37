//! DNS response codes.
//!
//! There are two types of response codes here. [`Rcode`] is the four bit
//! code carried in the message header. [`TsigRcode`] is the sixteen bit
//! code carried in the error field of a TSIG record. It shares the lower
//! values with the header codes and adds the TSIG specific ones.

//------------ Rcode ---------------------------------------------------------

int_enum! {
    /// DNS header response codes.
    ///
    /// The response code of a response indicates what happened on the
    /// server when trying to answer the query. The code is a 4 bit value.
    /// Values above 15 cannot be encoded in the header and are truncated to
    /// their lower four bits when written.
    ///
    /// See [RFC 1035] for response codes in general and the [DNS RCODEs]
    /// registry for all currently assigned values.
    ///
    /// [RFC 1035]: https://tools.ietf.org/html/rfc1035
    /// [DNS RCODEs]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6
    =>
    Rcode, u8;

    /// No error condition.
    (NoError => 0, "NOERROR")

    /// The name server was unable to interpret the query.
    (FormErr => 1, "FORMERR")

    /// The name server was unable to process this query due to a problem
    /// with the name server.
    (ServFail => 2, "SERVFAIL")

    /// The domain name given in the query does not exist.
    (NXDomain => 3, "NXDOMAIN")

    /// The name server does not support the requested kind of query.
    (NotImp => 4, "NOTIMP")

    /// The name server refuses to perform the operation for policy
    /// reasons.
    (Refused => 5, "REFUSED")

    /// A name exists when it should not.
    (YXDomain => 6, "YXDOMAIN")

    /// An RRset exists when it should not.
    (YXRRSet => 7, "YXRRSET")

    /// An RRset that should exist does not.
    (NXRRSet => 8, "NXRRSET")

    /// The server is not authoritative for the zone or the request is
    /// not authorized.
    (NotAuth => 9, "NOTAUTH")

    /// A name used in an update is not within the zone.
    (NotZone => 10, "NOTZONE")
}

int_enum_str_with_prefix!(Rcode, "RCODE", u8, "unknown rcode");

//------------ TsigRcode -----------------------------------------------------

int_enum! {
    /// Response codes for transaction authentication (TSIG).
    ///
    /// TSIG records contain a 16 bit response code of their own. The
    /// values 0 to 15 are the same as the header codes. The values
    /// starting at 16 are specific to transaction authentication as
    /// defined in [RFC 8945] and a few related documents.
    ///
    /// [RFC 8945]: https://tools.ietf.org/html/rfc8945
    =>
    TsigRcode, u16;

    /// No error condition.
    (NoError => 0, "NOERROR")

    /// Format error.
    (FormErr => 1, "FORMERR")

    /// Server failure.
    (ServFail => 2, "SERVFAIL")

    /// The domain name does not exist.
    (NXDomain => 3, "NXDOMAIN")

    /// Not implemented.
    (NotImp => 4, "NOTIMP")

    /// Query refused.
    (Refused => 5, "REFUSED")

    /// Not authorized.
    (NotAuth => 9, "NOTAUTH")

    /// The MAC of a signed message could not be verified.
    (BadSig => 16, "BADSIG")

    /// The key used for a signed message is not known.
    (BadKey => 17, "BADKEY")

    /// The signature time is outside the permitted window.
    (BadTime => 18, "BADTIME")

    /// Bad TKEY mode.
    (BadMode => 19, "BADMODE")

    /// Duplicate key name.
    (BadName => 20, "BADNAME")

    /// Algorithm not supported.
    (BadAlg => 21, "BADALG")

    /// Bad truncation of the MAC.
    (BadTrunc => 22, "BADTRUNC")

    /// Bad or missing server cookie.
    (BadCookie => 23, "BADCOOKIE")
}

int_enum_str_with_prefix!(TsigRcode, "RCODE", u16, "unknown TSIG rcode");

impl TsigRcode {
    /// Returns the header response code to use for this error.
    ///
    /// All TSIG specific errors are signalled as NOTAUTH in the header.
    pub fn header_rcode(self) -> Rcode {
        match u8::try_from(self.to_int()) {
            Ok(value) if value < 16 => Rcode::from_int(value),
            _ => Rcode::NotAuth,
        }
    }
}

impl From<Rcode> for TsigRcode {
    fn from(rcode: Rcode) -> Self {
        TsigRcode::from_int(u16::from(rcode.to_int()))
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use core::str::FromStr;
    use rstest::rstest;

    #[rstest]
    #[case("NOERROR", Rcode::NoError)]
    #[case("nxdomain", Rcode::NXDomain)]
    #[case("RCODE9", Rcode::NotAuth)]
    #[case("RCODE12", Rcode::Unknown(12))]
    fn rcode_from_str(#[case] s: &str, #[case] rcode: Rcode) {
        assert_eq!(Rcode::from_str(s).unwrap(), rcode);
    }

    #[test]
    fn tsig_header_rcode() {
        assert_eq!(TsigRcode::BadSig.header_rcode(), Rcode::NotAuth);
        assert_eq!(TsigRcode::FormErr.header_rcode(), Rcode::FormErr);
        assert_eq!(TsigRcode::from(Rcode::Refused), TsigRcode::Refused);
        assert_eq!(TsigRcode::BadTrunc.to_string(), "BADTRUNC");
    }
}
