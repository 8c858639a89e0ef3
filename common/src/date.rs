//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{
    cmp::Ordering, fmt, hash, marker::PhantomData, str::FromStr,
};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{macros::format_description, Month};

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without a time zone.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Creates a new [`Date`] representing the current UTC date.
    #[must_use]
    pub fn today() -> Self {
        Self {
            inner: time::OffsetDateTime::now_utc().date(),
            _of: PhantomData,
        }
    }

    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        Some(Self {
            inner: time::Date::from_calendar_date(year, month, day).ok()?,
            _of: PhantomData,
        })
    }

    /// Returns the calendar year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    /// Parses a [`Date`] from its `yyyyMMdd` representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `yyyyMMdd` date.
    pub fn parse_compact(input: &str) -> Result<Self, ParseError> {
        if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::Format);
        }
        // Only out-of-range components are able to fail on 8 digits.
        time::Date::parse(input, format_description!("[year][month][day]"))
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
            .map_err(|_| ParseError::OutOfRange)
    }

    /// Parses a [`Date`] from its `yyyy-MM-dd` representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `yyyy-MM-dd` date.
    pub fn parse_iso(input: &str) -> Result<Self, ParseError> {
        time::Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
            .map_err(|e| {
                if matches!(e, time::error::Parse::TryFromParsed(_)) {
                    ParseError::OutOfRange
                } else {
                    ParseError::Format
                }
            })
    }

    /// Returns the `yyyyMMdd` representation of this [`Date`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_compact(&self) -> String {
        self.inner
            .format(format_description!("[year][month][day]"))
            .unwrap_or_else(|e| {
                panic!("cannot format `Date` as `yyyyMMdd`: {e}")
            })
    }

    /// Returns the `yyyy-MM-dd` representation of this [`Date`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_iso(&self) -> String {
        self.inner
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|e| {
                panic!("cannot format `Date` as `yyyy-MM-dd`: {e}")
            })
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Returns the current UTC calendar year.
#[must_use]
pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

/// Error of parsing [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ParseError {
    /// String doesn't follow any supported date format.
    #[display("expected `yyyy-MM-dd` or `yyyyMMdd` date")]
    Format,

    /// Parsed date components don't form a valid calendar date.
    #[display("date components are out of range")]
    OutOfRange,
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    /// Parses a [`Date`] from either `yyyy-MM-dd` or `yyyyMMdd` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('-') {
            Self::parse_iso(s)
        } else {
            Self::parse_compact(s)
        }
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> hash::Hash for DateOf<Of> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, ParseError};

    #[test]
    fn parses_both_forms() {
        let expected = Date::from_ymd(2024, 3, 9).unwrap();

        assert_eq!("20240309".parse::<Date>(), Ok(expected));
        assert_eq!(
            Date::parse_compact("20240229"),
            Ok(Date::from_ymd(2024, 2, 29).unwrap()),
        );
        assert_eq!("2024-03-09".parse::<Date>(), Ok(expected));
        assert_eq!(" 2024-03-09\n".parse::<Date>(), Ok(expected));
    }

    #[test]
    fn formats_both_forms() {
        let date = Date::from_ymd(2025, 12, 1).unwrap();

        assert_eq!(date.to_compact(), "20251201");
        assert_eq!(date.to_iso(), "2025-12-01");
        assert_eq!(date.to_string(), "2025-12-01");
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!("2024039".parse::<Date>(), Err(ParseError::Format));
        assert_eq!("2024O309".parse::<Date>(), Err(ParseError::Format));
        assert_eq!("03/09/2024".parse::<Date>(), Err(ParseError::Format));
        assert_eq!("".parse::<Date>(), Err(ParseError::Format));
        assert_eq!("20240230".parse::<Date>(), Err(ParseError::OutOfRange));
        assert_eq!("20241301".parse::<Date>(), Err(ParseError::OutOfRange));
        assert_eq!("20240001".parse::<Date>(), Err(ParseError::OutOfRange));
        assert_eq!("20240132".parse::<Date>(), Err(ParseError::OutOfRange));
        assert_eq!("+2024031".parse::<Date>(), Err(ParseError::Format));
        assert_eq!(
            "2024-02-30".parse::<Date>(),
            Err(ParseError::OutOfRange),
        );
    }

    #[test]
    fn orders_chronologically() {
        let earlier = Date::from_ymd(2023, 12, 31).unwrap();
        let later = Date::from_ymd(2024, 1, 1).unwrap();

        assert!(earlier < later);
        assert_eq!(later.year(), 2024);
    }
}
