//! Resource record types.

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource record types.
    ///
    /// Each resource record has a 16 bit type value indicating what kind of
    /// information is represented by the record. Normal query includes the
    /// type of record information that is requested for a given domain
    /// name. A few types are only valid in questions, namely IXFR, AXFR,
    /// and ANY.
    ///
    /// For an overview of assigned values see the [DNS Resource Record
    /// (RR) TYPEs] registry.
    ///
    /// [DNS Resource Record (RR) TYPEs]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
    =>
    Rtype, u16;

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (Ns => 2, "NS")

    /// The canonical name for an alias.
    (Cname => 5, "CNAME")

    /// Marks the start of a zone of authority.
    (Soa => 6, "SOA")

    /// A domain name pointer.
    (Ptr => 12, "PTR")

    /// Mail exchange.
    (Mx => 15, "MX")

    /// Text strings.
    (Txt => 16, "TXT")

    /// Signature, RFC 2535, used today for SIG(0) only.
    (Sig => 24, "SIG")

    /// Security key.
    (Key => 25, "KEY")

    /// IPv6 address.
    (Aaaa => 28, "AAAA")

    /// Delegation of a whole subtree, RFC 6672.
    (Dname => 39, "DNAME")

    /// EDNS pseudo record.
    (Opt => 41, "OPT")

    /// Delegation signer.
    (Ds => 43, "DS")

    /// DNSSEC signature.
    (Rrsig => 46, "RRSIG")

    /// Next secure record.
    (Nsec => 47, "NSEC")

    /// DNSSEC key.
    (Dnskey => 48, "DNSKEY")

    /// Transaction signature.
    (Tsig => 250, "TSIG")

    /// Incremental zone transfer.
    (Ixfr => 251, "IXFR")

    /// Transfer of an entire zone.
    (Axfr => 252, "AXFR")

    /// A request for all records the server has available.
    (Any => 255, "ANY")
}

int_enum_str_with_prefix!(Rtype, "TYPE", u16, "unknown record type");

impl Rtype {
    /// Returns whether the type may only appear in a question.
    pub fn is_question_only(self) -> bool {
        matches!(
            Rtype::from_int(self.to_int()),
            Rtype::Ixfr | Rtype::Axfr | Rtype::Any
        )
    }

    /// Returns whether records of this type carry a signature over an
    /// RRset.
    pub fn is_signature(self) -> bool {
        matches!(Rtype::from_int(self.to_int()), Rtype::Sig | Rtype::Rrsig)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::Rtype;
    use core::str::FromStr;

    #[test]
    fn mnemonics() {
        assert_eq!(Rtype::from_str("aaaa").unwrap(), Rtype::Aaaa);
        assert_eq!(Rtype::from_str("TYPE46").unwrap(), Rtype::Rrsig);
        assert_eq!(Rtype::Unknown(65).to_string(), "TYPE65");
        assert_eq!(Rtype::Rrsig.to_string(), "RRSIG");
        assert!(Rtype::from_str("FOO").is_err());
    }
}
