//! [`Pattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL `LIKE` pattern matching a text containing the provided fragment.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct Pattern(String);

impl Pattern {
    /// Creates a new [`Pattern`] matching any text containing the given
    /// `fragment` literally.
    #[must_use]
    pub fn containing(fragment: &str) -> Self {
        let escaped = fragment
            .replace('\\', r"\\")
            .replace('%', r"\%")
            .replace('_', r"\_");
        Self(format!("%{escaped}%"))
    }
}
