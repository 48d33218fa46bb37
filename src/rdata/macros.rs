//! Macros for use in rdata definitions.
//!
//! These macros are not public but are used by the super module only. They
//! are here so that `mod.rs` doesn’t become too unwieldly.

/// Creates the `AllRecordData` enum over all known record data types.
///
/// Each module is given with the list of types it provides. The variant
/// for each type is named after the type.
macro_rules! rdata_types {
    ( $( $module:ident::{ $( $rtype:ident ),* $(,)? } )* ) => {
        $(
            pub use self::$module::{ $( $rtype ),* };
        )*

        //------------- AllRecordData ----------------------------------------

        /// Record data for all record types.
        ///
        /// This enum collects the record data types for all record types
        /// known to this crate. Data of all other types is kept in the
        /// `Unknown` variant as raw octets.
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub enum AllRecordData {
            $( $(
                $rtype($rtype),
            )* )*
            Unknown(UnknownRecordData),
        }

        impl AllRecordData {
            /// Returns the record type of the data.
            #[must_use]
            pub fn rtype(&self) -> Rtype {
                match *self {
                    $( $(
                        AllRecordData::$rtype(_) => {
                            <$rtype as RecordData>::RTYPE
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => inner.rtype(),
                }
            }

            /// Parses record data of the given type.
            ///
            /// The parser must be positioned at the start of the record data
            /// and `rdlen` octets of data must follow. Parsing will consume
            /// exactly those octets or fail.
            pub fn parse(
                rtype: Rtype,
                parser: &mut Parser<[u8]>,
                rdlen: usize,
            ) -> Result<Self, ParseError> {
                let end = parser.pos() + rdlen;
                if parser.remaining() < rdlen {
                    return Err(ParseError::ShortInput);
                }
                let res = match Rtype::from_int(rtype.to_int()) {
                    $( $(
                        Rtype::$rtype => {
                            $rtype::parse_rdata(parser, rdlen)
                                .map(AllRecordData::$rtype)?
                        }
                    )* )*
                    _ => {
                        AllRecordData::Unknown(
                            UnknownRecordData::parse(rtype, parser, rdlen)?
                        )
                    }
                };
                if parser.pos() != end {
                    return Err(ParseError::form_error(
                        "record data length mismatch"
                    ));
                }
                Ok(res)
            }

            /// Scans record data of the given type.
            ///
            /// The generic format of [RFC 3597] is accepted for all types.
            ///
            /// [RFC 3597]: https://tools.ietf.org/html/rfc3597
            pub fn scan(
                rtype: Rtype,
                scanner: &mut Scanner,
            ) -> Result<Self, ScanError> {
                if scanner.peek().map(Token::as_str) == Some("\\#") {
                    let unknown = UnknownRecordData::scan(rtype, scanner)?;
                    return Self::from_unknown(unknown).map_err(|err| {
                        ScanError::custom(format!(
                            "invalid generic record data: {}", err
                        ))
                    });
                }
                match Rtype::from_int(rtype.to_int()) {
                    $( $(
                        Rtype::$rtype => {
                            $rtype::scan_rdata(scanner)
                                .map(AllRecordData::$rtype)
                        }
                    )* )*
                    _ => Err(ScanError::custom(format!(
                        "record type {} requires generic record data", rtype
                    ))),
                }
            }

            /// Converts raw record data into data of the known type.
            ///
            /// Data of unknown types is returned as is.
            pub fn from_unknown(
                data: UnknownRecordData
            ) -> Result<Self, ParseError> {
                let octets = data.data().clone();
                let mut parser = Parser::from_ref(&octets[..]);
                match AllRecordData::parse(
                    data.rtype(), &mut parser, octets.len()
                )? {
                    AllRecordData::Unknown(_) => {
                        Ok(AllRecordData::Unknown(data))
                    }
                    res => Ok(res),
                }
            }

            /// Appends the wire format of the record data.
            ///
            /// Domain names are compressed if a compressor is given and the
            /// record type allows compression.
            pub fn compose_rdata(
                &self,
                target: &mut BytesMut,
                compressor: Option<&mut Compressor>,
            ) {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => {
                            inner.compose_rdata(target, compressor)
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => {
                        inner.compose_rdata(target)
                    }
                }
            }

            /// Appends the canonical wire format of the record data.
            pub fn compose_canonical_rdata(&self, target: &mut BytesMut) {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => {
                            inner.compose_canonical_rdata(target)
                        }
                    )* )*
                    AllRecordData::Unknown(ref inner) => {
                        inner.compose_rdata(target)
                    }
                }
            }
        }

        //--- From

        $( $(
            impl From<$rtype> for AllRecordData {
                fn from(value: $rtype) -> Self {
                    AllRecordData::$rtype(value)
                }
            }
        )* )*

        impl From<UnknownRecordData> for AllRecordData {
            fn from(value: UnknownRecordData) -> Self {
                AllRecordData::Unknown(value)
            }
        }

        //--- Display

        impl fmt::Display for AllRecordData {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match *self {
                    $( $(
                        AllRecordData::$rtype(ref inner) => fmt::Display::fmt(inner, f),
                    )* )*
                    AllRecordData::Unknown(ref inner) => fmt::Display::fmt(inner, f),
                }
            }
        }
    }
}

/// A macro for implementing a record data type with a single domain name.
///
/// The last argument states whether the name may be compressed when the
/// data is written to a message.
macro_rules! name_type {
    ($(#[$attr:meta])* ( $target:ident, $rtype:ident, $field:ident,
                         $compress:expr ) ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            $field: Name,
        }

        impl $target {
            /// Creates new record data from the domain name.
            #[must_use]
            pub fn new($field: Name) -> Self {
                $target { $field }
            }

            /// Returns a reference to the domain name.
            #[must_use]
            pub fn $field(&self) -> &Name {
                &self.$field
            }
        }

        //--- From and FromStr

        impl From<Name> for $target {
            fn from(name: Name) -> Self {
                Self::new(name)
            }
        }

        impl FromStr for $target {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Name::from_str(s).map(Self::new)
            }
        }

        //--- RecordData

        impl RecordData for $target {
            const RTYPE: Rtype = Rtype::$rtype;

            fn parse_rdata(
                parser: &mut Parser<[u8]>, _rdlen: usize
            ) -> Result<Self, ParseError> {
                Name::parse(parser).map(Self::new)
            }

            fn scan_rdata(scanner: &mut Scanner) -> Result<Self, ScanError> {
                scanner.scan_name().map(Self::new)
            }

            fn compose_rdata(
                &self,
                target: &mut BytesMut,
                compressor: Option<&mut Compressor>,
            ) {
                if $compress {
                    compose_name(&self.$field, target, compressor)
                } else {
                    self.$field.compose(target)
                }
            }

            fn compose_canonical_rdata(&self, target: &mut BytesMut) {
                self.$field.compose_canonical(target)
            }
        }

        //--- Display

        impl fmt::Display for $target {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.$field, f)
            }
        }
    }
}
