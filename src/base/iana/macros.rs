//! Macros defining the registry enums.

/// Defines an enum over an integer registry.
///
/// Comparison, ordering, and hashing go through the integer value. Text
/// conversion comes from `int_enum_str_with_prefix!`.
macro_rules! int_enum {
    ( $(#[$attr:meta])* =>
      $ianatype:ident, $inttype:ty;
      $( $(#[$variant_attr:meta])* ( $variant:ident =>
                                        $value:literal, $mnemonic:literal) )* ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug)]
        pub enum $ianatype {
            $( $(#[$variant_attr])* $variant, )*

            /// Any value without a variant of its own.
            Unknown($inttype),
        }

        impl $ianatype {
            /// Converts an integer into a value.
            #[must_use]
            pub const fn from_int(value: $inttype) -> Self {
                match value {
                    $( $value => $ianatype::$variant, )*
                    _ => $ianatype::Unknown(value),
                }
            }

            /// Converts the value into its integer.
            #[must_use]
            pub const fn to_int(self) -> $inttype {
                match self {
                    $( $ianatype::$variant => $value, )*
                    $ianatype::Unknown(value) => value,
                }
            }

            /// Looks up a registered mnemonic, ignoring ASCII case.
            #[must_use]
            pub fn from_mnemonic(m: &[u8]) -> Option<Self> {
                $(
                    if m.eq_ignore_ascii_case($mnemonic.as_bytes()) {
                        return Some($ianatype::$variant)
                    }
                )*
                None
            }

            /// Returns the registered mnemonic, if any.
            ///
            /// `Unknown` values that happen to be registered get one, too.
            #[must_use]
            pub const fn to_mnemonic(self) -> Option<&'static str> {
                match Self::from_int(self.to_int()) {
                    $( $ianatype::$variant => Some($mnemonic), )*
                    $ianatype::Unknown(_) => None,
                }
            }
        }

        impl From<$inttype> for $ianatype {
            fn from(value: $inttype) -> Self {
                $ianatype::from_int(value)
            }
        }

        impl From<$ianatype> for $inttype {
            fn from(value: $ianatype) -> Self {
                value.to_int()
            }
        }

        impl PartialEq for $ianatype {
            fn eq(&self, other: &Self) -> bool {
                self.to_int() == other.to_int()
            }
        }

        impl PartialEq<$inttype> for $ianatype {
            fn eq(&self, other: &$inttype) -> bool {
                self.to_int() == *other
            }
        }

        impl Eq for $ianatype { }

        impl PartialOrd for $ianatype {
            fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ianatype {
            fn cmp(&self, other: &Self) -> core::cmp::Ordering {
                self.to_int().cmp(&other.to_int())
            }
        }

        impl core::hash::Hash for $ianatype {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                core::hash::Hash::hash(&self.to_int(), state)
            }
        }
    }
}

/// Adds `FromStr` and `Display` using mnemonics and the generic form.
///
/// The generic form is `$str_prefix` followed by the decimal value.
macro_rules! int_enum_str_with_prefix {
    ($ianatype:ident, $str_prefix:expr, $inttype:ty, $estr:expr) => {
        impl core::str::FromStr for $ianatype {
            type Err = $crate::base::iana::FromStrError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Some(res) = $ianatype::from_mnemonic(s.as_bytes()) {
                    return Ok(res)
                }
                let generic = s
                    .get(..$str_prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case($str_prefix))
                    .and_then(|_| s[$str_prefix.len()..].parse::<$inttype>().ok());
                generic
                    .map($ianatype::from_int)
                    .ok_or($crate::base::iana::FromStrError($estr))
            }
        }

        impl core::fmt::Display for $ianatype {
            fn fmt(
                &self, f: &mut core::fmt::Formatter
            ) -> core::fmt::Result {
                match self.to_mnemonic() {
                    Some(m) => f.write_str(m),
                    None => write!(f, "{}{}", $str_prefix, self.to_int()),
                }
            }
        }
    }
}
