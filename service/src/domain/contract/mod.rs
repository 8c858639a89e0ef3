//! [`Contract`] definitions.

pub mod lease;
pub mod sale;

use std::sync::LazyLock;

use common::{define_kind, DateOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use uuid::Uuid;

use crate::domain::{define_text, Vehicle};

pub use self::{lease::Lease, sale::Sale};

/// Signed [`Vehicle`] contract.
#[derive(Clone, Debug, From)]
pub enum Contract {
    #[doc(hidden)]
    Sale(Sale),
    #[doc(hidden)]
    Lease(Lease),
}

impl Contract {
    /// Returns ID of this [`Contract`], if it's stored already.
    #[must_use]
    pub fn id(&self) -> Option<Id> {
        self.details().id
    }

    /// Returns [`Kind`] of this [`Contract`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Sale(_) => Kind::Sale,
            Self::Lease(_) => Kind::Lease,
        }
    }

    /// Returns [`Details`] shared by all kinds of [`Contract`]s.
    #[must_use]
    pub fn details(&self) -> &Details {
        match self {
            Self::Sale(c) => c.details(),
            Self::Lease(c) => c.details(),
        }
    }

    /// Returns [`Vehicle`] transacted by this [`Contract`].
    #[must_use]
    pub fn vehicle(&self) -> &Vehicle {
        &self.details().vehicle
    }

    /// Returns total price of this [`Contract`].
    #[must_use]
    pub fn total_price(&self) -> Money {
        match self {
            Self::Sale(c) => c.pricing().total_price,
            Self::Lease(c) => c.pricing().total_price,
        }
    }

    /// Returns monthly payment of this [`Contract`].
    ///
    /// Zero for [`Contract`]s paid at once.
    #[must_use]
    pub fn monthly_payment(&self) -> Money {
        match self {
            Self::Sale(c) => c.pricing().monthly_payment,
            Self::Lease(c) => c.pricing().monthly_payment,
        }
    }

    /// Returns a copy of this [`Contract`] with the provided [`Id`] assigned.
    #[must_use]
    pub fn with_id(self, id: Id) -> Self {
        match self {
            Self::Sale(c) => Self::Sale(c.with_id(id)),
            Self::Lease(c) => Self::Lease(c.with_id(id)),
        }
    }
}

/// Details shared by all kinds of [`Contract`]s.
#[derive(Clone, Debug)]
pub struct Details {
    /// ID of the [`Contract`], assigned once it's stored.
    pub id: Option<Id>,

    /// [`Date`] the [`Contract`] was signed at.
    pub date: Date,

    /// [`CustomerName`] of the [`Contract`].
    pub customer_name: CustomerName,

    /// [`CustomerEmail`] of the [`Contract`].
    pub customer_email: CustomerEmail,

    /// [`Vehicle`] transacted by the [`Contract`].
    pub vehicle: Vehicle,
}

/// ID of a [`Contract`].
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of a [`Contract`]."]
    enum Kind {
        #[doc = "Purchase of a [`Vehicle`]."]
        Sale = 1,

        #[doc = "Lease of a [`Vehicle`]."]
        Lease = 2,
    }
}

/// Date a [`Contract`] was signed at.
pub type Date = DateOf<Contract>;

define_text! {
    #[doc = "Full name of a [`Contract`] customer."]
    pub struct CustomerName(max = 256);
}

/// Email address of a [`Contract`] customer.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct CustomerEmail(String);

impl CustomerEmail {
    /// Creates a new [`CustomerEmail`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `email` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Creates a new [`CustomerEmail`] out of the trimmed `email`, if it's
    /// valid.
    #[must_use]
    pub fn new(email: impl AsRef<str>) -> Option<Self> {
        let email = email.as_ref().trim();
        Self::check(email).then(|| Self(email.to_owned()))
    }

    /// Returns the text of this [`CustomerEmail`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `email` is a valid [`CustomerEmail`].
    fn check(email: &str) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s|]+@[^@\s|]+$").expect("valid regex")
        });

        email.len() <= 254 && REGEX.is_match(email)
    }
}

impl FromStr for CustomerEmail {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CustomerEmail`")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{CustomerEmail, CustomerName, Kind};

    #[test]
    fn customer_email_format() {
        assert_eq!(
            CustomerEmail::new(" jane@example.com ").unwrap().as_str(),
            "jane@example.com",
        );
        assert!(CustomerEmail::new("a@b").is_some());
        assert!(CustomerEmail::new("").is_none());
        assert!(CustomerEmail::new("jane.example.com").is_none());
        assert!(CustomerEmail::new("jane@@example.com").is_none());
        assert!(CustomerEmail::new("ja ne@example.com").is_none());
        assert!(CustomerEmail::new("jane|x@example.com").is_none());
        assert!(CustomerEmail::from_str("@example.com").is_err());
    }

    #[test]
    fn customer_name_is_required() {
        assert_eq!(
            CustomerName::new("  Jane Doe ").unwrap().as_str(),
            "Jane Doe",
        );
        assert!(CustomerName::new(" ").is_none());
        assert!(CustomerName::new("Jane|Doe").is_none());
    }

    #[test]
    fn kind_representation() {
        assert_eq!(Kind::Sale.to_string(), "SALE");
        assert_eq!(Kind::from_str("lease"), Ok(Kind::Lease));
        assert_eq!(Kind::Lease.u8(), 2);
    }
}
