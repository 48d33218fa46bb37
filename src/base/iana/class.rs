//! DNS CLASSes.

//------------ Class ---------------------------------------------------------

int_enum! {
    /// DNS CLASSes.
    ///
    /// The domain name space is partitioned into separate classes for
    /// different network types. In practice, only the IN class is really
    /// relevant. In addition, there are the query classes NONE and ANY. The
    /// latter is also used as the class of TSIG records.
    ///
    /// See [RFC 1034] for the introduction of classes and section 3.2 of
    /// [RFC 6895] for the current state of affairs.
    ///
    /// [RFC 1034]: https://tools.ietf.org/html/rfc1034
    /// [RFC 6895]: https://tools.ietf.org/html/rfc6895
    =>
    Class, u16;

    /// Internet (IN).
    (In => 1, "IN")

    /// Chaosnet (CH).
    (Ch => 3, "CH")

    /// Hesiod (HS).
    (Hs => 4, "HS")

    /// Query class NONE, used by dynamic update.
    (None => 0xFE, "NONE")

    /// Query class ANY.
    (Any => 0xFF, "ANY")
}

int_enum_str_with_prefix!(Class, "CLASS", u16, "unknown class");

//============ Tests =========================================================
