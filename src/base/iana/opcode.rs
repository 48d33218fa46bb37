//! DNS OpCodes

//------------ Opcode --------------------------------------------------------

int_enum! {
    /// DNS OpCodes.
    ///
    /// The opcode specifies the kind of query to be performed. It is a four
    /// bit value in the message header. Values above 15 cannot be encoded
    /// and are truncated to their lower four bits when written.
    ///
    /// The currently assigned values are listed in the [DNS OpCodes]
    /// registry.
    ///
    /// [DNS OpCodes]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5
    =>
    Opcode, u8;

    /// A standard query.
    (Query => 0, "QUERY")

    /// An inverse query, obsoleted by RFC 3425.
    (IQuery => 1, "IQUERY")

    /// A server status request.
    (Status => 2, "STATUS")

    /// A NOTIFY query, RFC 1996.
    (Notify => 4, "NOTIFY")

    /// An UPDATE query, RFC 2136.
    (Update => 5, "UPDATE")
}

int_enum_str_with_prefix!(Opcode, "OPCODE", u8, "unknown opcode");
