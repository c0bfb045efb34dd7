//! Calendar-date codec for the `delivery_on` wire field.
//!
//! # Design
//! The integration API sends delivery dates as bare `YYYY-MM-DD` strings,
//! which are not valid RFC 3339 timestamps. `CalendarDate` models the value
//! directly as a date with no time-of-day and no timezone, and absence is
//! modelled with `Option` rather than a zero sentinel. On the wire an absent
//! date is the JSON literal `null`.
//!
//! Parsing is strict: exactly four year digits, two month digits and two day
//! digits separated by `-`, and the result must be a real calendar date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Wire form of an absent date.
pub const NULL: &str = "null";

/// Returned when date text is not a strict `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date {input:?}: expected YYYY-MM-DD")]
pub struct DateFormatError {
    pub input: String,
}

/// A calendar date with no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Returns `None` when the components do not form a real date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for CalendarDate {
    type Err = DateFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DateFormatError { input: s.to_string() };
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(err());
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !digits_ok {
            return Err(err());
        }
        // All slices are ASCII digits at this point, so the numeric parses
        // only fail on overflow, which four digits cannot reach.
        let year: i32 = s[0..4].parse().map_err(|_| err())?;
        let month: u32 = s[5..7].parse().map_err(|_| err())?;
        let day: u32 = s[8..10].parse().map_err(|_| err())?;
        Self::from_ymd(year, month, day).ok_or_else(err)
    }
}

/// Encode an optional date to its wire text: a quoted `"YYYY-MM-DD"`, or
/// `null` when absent.
pub fn encode(date: Option<CalendarDate>) -> String {
    match date {
        Some(date) => format!("\"{date}\""),
        None => NULL.to_string(),
    }
}

/// Decode wire text into an optional date.
///
/// Surrounding quotes are stripped before anything else, so both `null` and
/// `"null"` decode as absent.
pub fn decode(input: &str) -> Result<Option<CalendarDate>, DateFormatError> {
    let unquoted = input.trim_matches('"');
    if unquoted == NULL {
        return Ok(None);
    }
    unquoted.parse().map(Some).map_err(|_| DateFormatError {
        input: input.to_string(),
    })
}

/// Serde adapter for optional date fields that runs the text codec, so JSON
/// `null` and the string `"null"` both decode as absent.
pub fn deserialize_optional<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CalendarDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => decode(&text).map_err(de::Error::custom),
        None => Ok(None),
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DateVisitor;

        impl Visitor<'_> for DateVisitor {
            type Value = CalendarDate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a YYYY-MM-DD date string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CalendarDate, E> {
                v.trim_matches('"').parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DateVisitor)
    }
}
