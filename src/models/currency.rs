//! Display currency table.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::TrackerError;

/// Currency used to display amounts.
///
/// Only affects formatting. No conversion between currencies is ever
/// performed: switching currency relabels the same numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Bangladeshi taka.
    #[default]
    Bdt,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// Indian rupee.
    Inr,
    /// Japanese yen.
    Jpy,
}

impl Currency {
    /// Every supported currency, in selector order.
    pub const ALL: [Self; 6] = [
        Self::Bdt,
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Inr,
        Self::Jpy,
    ];

    /// ISO 4217 code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bdt => "BDT",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Inr => "INR",
            Self::Jpy => "JPY",
        }
    }

    /// Display symbol.
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Bdt => "\u{09f3}",
            Self::Usd => "$",
            Self::Eur => "\u{20ac}",
            Self::Gbp => "\u{00a3}",
            Self::Inr => "\u{20b9}",
            Self::Jpy => "\u{00a5}",
        }
    }

    /// Formats an amount as symbol plus grouped value, e.g. `$1,250.00`.
    #[inline]
    #[must_use]
    pub fn format(self, amount: Amount) -> String {
        let grouped = amount.grouped();
        let mut out = String::with_capacity(self.symbol().len() + grouped.len());
        out.push_str(self.symbol());
        out.push_str(&grouped);
        out
    }
}

impl fmt::Display for Currency {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = TrackerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TrackerError::invalid("currency", input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_taka() {
        assert_eq!(Currency::default(), Currency::Bdt);
        assert_eq!(Currency::default().symbol(), "\u{09f3}");
    }

    #[test]
    fn serde_uses_uppercase_codes() {
        for currency in Currency::ALL {
            let json = serde_json::to_string(&currency).unwrap();
            assert_eq!(json, format!("\"{}\"", currency.code()));
            let deserialized: Currency = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, currency);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::Gbp);
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn format_prefixes_symbol() {
        assert_eq!(Currency::Usd.format(Amount::new(125_000)), "$1,250.00");
        assert_eq!(
            Currency::Eur.format(Amount::from_major(-40)),
            "\u{20ac}-40.00"
        );
        assert_eq!(
            Currency::Bdt.format(Amount::from_major(80_000)),
            "\u{09f3}80,000.00"
        );
    }
}
