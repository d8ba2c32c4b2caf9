//! Calendar-month views over a collection.
//!
//! Filtering never mutates or reorders the source collection; it returns
//! a new sequence of references in the original relative order.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TrackerError;
use crate::models::Entry;

/// A calendar year and month, e.g. `2025-01`.
///
/// Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Calendar year.
    year: i32,
    /// Month, `1..=12`.
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, or `None` if `month` is not in `1..=12`.
    #[inline]
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The year-month a date falls in.
    #[inline]
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[inline]
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, `1..=12`.
    #[inline]
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Returns `true` if `date` has this year and month.
    #[inline]
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// First day of the month, if representable.
    #[inline]
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Short chart label such as `Jan 2025`.
    #[must_use]
    pub fn label(self) -> String {
        self.first_day().map_or_else(
            || self.to_string(),
            |day| day.format("%b %Y").to_string(),
        )
    }
}

impl fmt::Display for YearMonth {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = TrackerError;

    /// Parses `YYYY-MM`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::invalid("month", input);
        let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_err| invalid())?;
        let month: u32 = month.parse().map_err(|_err| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Returns the entries dated within `month`, or all entries if `month` is
/// `None`, in their original relative order.
///
/// Filtering by calendar components means the result does not depend on
/// any timezone.
#[inline]
#[must_use]
pub fn filter_by_month<C>(collection: &[Entry<C>], month: Option<YearMonth>) -> Vec<&Entry<C>> {
    match month {
        Some(wanted) => collection
            .iter()
            .filter(|entry| wanted.contains(entry.date))
            .collect(),
        None => collection.iter().collect(),
    }
}

/// Sorts entries for tabular display: most recent date first, entries on
/// the same date kept in their incoming order.
#[inline]
#[must_use]
pub fn newest_first<C>(mut entries: Vec<&Entry<C>>) -> Vec<&Entry<C>> {
    entries.sort_by(|left, right| right.date.cmp(&left.date));
    entries
}

/// Every distinct month that has at least one entry in either collection,
/// most recent first. Used to populate month selectors.
#[must_use]
pub fn months_present<I, E>(income: &[Entry<I>], expenses: &[Entry<E>]) -> Vec<YearMonth> {
    let mut months: Vec<YearMonth> = income
        .iter()
        .map(|entry| YearMonth::of(entry.date))
        .chain(expenses.iter().map(|entry| YearMonth::of(entry.date)))
        .collect();
    months.sort_unstable_by(|left, right| right.cmp(left));
    months.dedup();
    months
}
