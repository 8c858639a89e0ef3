//! Domain definitions.

pub mod contract;
pub mod vehicle;

pub use self::{contract::Contract, vehicle::Vehicle};

/// Defines a free-text newtype over a [`String`].
///
/// Values are trimmed on creation and must be non-empty, at most `max`
/// characters long, and must contain neither `|` nor control characters,
/// so they fit into a single field of a flat-file record.
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        pub struct $name:ident(max = $max:literal);
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        pub struct $name(String);

        impl $name {
            /// Creates a new value without performing any validation.
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Creates a new value out of the trimmed `value`, if it's valid.
            #[must_use]
            pub fn new(value: impl AsRef<str>) -> Option<Self> {
                let value = value.as_ref().trim();
                Self::check(value).then(|| Self(value.to_owned()))
            }

            /// Returns the text of this value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Checks whether the given `value` is valid.
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= $max
                    && !value.contains(|c: char| c == '|' || c.is_control())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `",
                    ::core::stringify!($name),
                    "`",
                ))
            }
        }
    };
}

pub(crate) use define_text;
