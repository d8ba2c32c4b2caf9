//! Fixed-point money and percentage values.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TrackerError;

/// Minor units per major unit for every supported currency.
const MINOR_PER_MAJOR: i64 = 100;

/// Signed money amount stored as an integer number of minor units
/// (cents, paisa, ...).
///
/// All sums and differences are exact. Conversion to major units only
/// happens when formatting or serializing.
///
/// On disk the amount is a JSON number in major units: `80000` for a whole
/// amount, `12.5` otherwise.
///
/// Parsed and decoded amounts are bounded by [`Amount::MAX`] in magnitude.
/// Arithmetic saturates at the `i64` range instead of wrapping.
///
/// # Examples
///
/// ```
/// use fintrack::models::Amount;
///
/// let rent: Amount = "25000".parse().unwrap();
/// let food: Amount = "12000,50".parse().unwrap();
/// assert_eq!((rent + food).minor_units(), 3_700_050);
/// assert_eq!((rent + food).to_string(), "37000.50");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Largest magnitude an entry amount may have: 9,999,999,999,999.99.
    ///
    /// Every amount up to this bound survives the JSON number form exactly.
    pub const MAX: Self = Self(999_999_999_999_999);

    /// Creates an amount from minor units.
    #[inline]
    #[must_use]
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Creates an amount from a whole number of major units.
    #[inline]
    #[must_use]
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Returns the raw value in minor units.
    #[inline]
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is strictly greater than zero.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is below zero.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns `true` if the amount is exactly zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the magnitude does not exceed [`Amount::MAX`].
    #[inline]
    #[must_use]
    pub const fn is_within_limit(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0.unsigned_abs()
    }

    /// Wraps `minor_units` if it is within [`Amount::MAX`].
    const fn bounded(minor_units: i64) -> Option<Self> {
        let amount = Self(minor_units);
        if amount.is_within_limit() {
            Some(amount)
        } else {
            None
        }
    }

    /// Formats the amount with `,` thousands separators and two decimals,
    /// e.g. `-1,234,567.89`.
    #[must_use]
    pub fn grouped(self) -> String {
        let (whole, frac) = self.split();
        let digits = whole.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len().div_euclid(3) + 4);
        if self.is_negative() {
            out.push('-');
        }
        let lead = digits.len() % 3;
        for (pos, ch) in digits.chars().enumerate() {
            if pos != 0 && pos % 3 == lead {
                out.push(',');
            }
            out.push(ch);
        }
        out.push('.');
        if frac < 10 {
            out.push('0');
        }
        out.push_str(&frac.to_string());
        out
    }

    /// Splits the absolute value into whole major units and the remainder.
    const fn split(self) -> (u64, u64) {
        let abs = self.0.unsigned_abs();
        (abs.div_euclid(100), abs.rem_euclid(100))
    }
}

impl fmt::Display for Amount {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let (whole, frac) = self.split();
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Amount {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Amount {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    #[inline]
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Amount {
    #[inline]
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Amount {
    type Err = TrackerError;

    /// Parses a decimal string in major units.
    ///
    /// Accepts `.` or `,` as the decimal separator and an optional leading
    /// sign. More than two fractional digits and magnitudes above
    /// [`Amount::MAX`] are rejected.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::invalid("amount", input);

        let trimmed = input.trim();
        let (negative, unsigned) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let normalized = unsigned.replace(',', ".");
        let (whole_str, frac_str) = match normalized.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (normalized.as_str(), ""),
        };
        if whole_str.is_empty() || !whole_str.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac_str.len() > 2 || !frac_str.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole_str.parse().map_err(|_err| invalid())?;
        let frac: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_err| invalid())? * 10,
            _ => frac_str.parse::<i64>().map_err(|_err| invalid())?,
        };

        let total = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|minor| minor.checked_add(frac))
            .and_then(Self::bounded)
            .ok_or_else(invalid)?;
        Ok(if negative { -total } else { total })
    }
}

impl Serialize for Amount {
    #[inline]
    #[allow(
        clippy::cast_precision_loss,
        reason = "stored amounts are bounded by Amount::MAX, below 2^53 minor units"
    )]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.rem_euclid(MINOR_PER_MAJOR) == 0 {
            serializer.serialize_i64(self.0.div_euclid(MINOR_PER_MAJOR))
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0_f64)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Float form of [`Amount::MAX`]; exact, since it is below 2^53.
const MAX_MINOR_F64: f64 = 999_999_999_999_999.0;

/// Accepts integer or floating JSON numbers in major units, up to
/// [`Amount::MAX`] in magnitude.
struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in major currency units")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
        value
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(Amount::bounded)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
        i64::try_from(value)
            .ok()
            .and_then(|major| major.checked_mul(MINOR_PER_MAJOR))
            .and_then(Amount::bounded)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "value is rounded and checked against Amount::MAX first"
    )]
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
        if !value.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        let minor = (value * 100.0_f64).round();
        if minor.abs() > MAX_MINOR_F64 {
            return Err(E::custom("amount out of range"));
        }
        Ok(Amount(minor as i64))
    }
}

/// A percentage with one decimal place, stored in tenths of a percent.
///
/// `Percentage::new(688)` is 68.8%.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(i64);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// Creates a percentage from tenths of a percent.
    #[inline]
    #[must_use]
    pub const fn new(tenths: i64) -> Self {
        Self(tenths)
    }

    /// Returns `part / whole * 100` rounded half away from zero to one
    /// decimal place, or zero when `whole` is zero.
    #[must_use]
    pub fn ratio(part: Amount, whole: Amount) -> Self {
        if whole.is_zero() {
            return Self::ZERO;
        }
        let num = i128::from(part.0) * 1000;
        let den = i128::from(whole.0);
        let negative = (num < 0) != (den < 0);
        let (abs_num, abs_den) = (num.abs(), den.abs());
        let rounded = (2 * abs_num + abs_den).div_euclid(2 * abs_den);
        let signed = if negative { -rounded } else { rounded };
        Self(i64::try_from(signed).unwrap_or(if negative { i64::MIN } else { i64::MAX }))
    }
}

impl fmt::Display for Percentage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}%", abs.div_euclid(10), abs.rem_euclid(10))
    }
}
