//! Closed string enums stored as TEXT and serialized in `SCREAMING_SNAKE_CASE`.

/// Declare a closed enum with `as_str`, `Display`, `FromStr` and serde support.
///
/// Unknown strings parse to [`crate::DomainError::Validation`].
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored and serialized form.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::DomainError;

            fn from_str(s: &str) -> $crate::errors::Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::errors::DomainError::validation(
                        stringify!($name),
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }
    };
}
