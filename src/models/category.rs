//! Entry kinds and their fixed category sets.

use core::fmt;
use core::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Which collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl EntryKind {
    /// Lower-case name, as used in messages.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Capitalized name, as used in the CSV `Type` column.
    #[inline]
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl fmt::Display for EntryKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = TrackerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(TrackerError::invalid("entry kind", input)),
        }
    }
}

/// A category enumeration tied to one entry kind.
///
/// Implemented by [`IncomeCategory`] and [`ExpenseCategory`]; the
/// repository, filter and summary functions are generic over it so both
/// collections share one implementation.
pub trait Category:
    Copy
    + Ord
    + fmt::Debug
    + fmt::Display
    + FromStr<Err = TrackerError>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Collection this category set belongs to.
    const KIND: EntryKind;

    /// Every category, in selector order.
    const ALL: &'static [Self];

    /// Human-readable label, identical to the serialized form.
    fn label(self) -> &'static str;
}

/// Defines a category enum with its label table, `Display`, `FromStr` and
/// [`Category`] impls.
macro_rules! define_categories {
    (
        $(#[$meta:meta])*
        $name:ident for $kind:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Category for $name {
            const KIND: EntryKind = EntryKind::$kind;

            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            #[inline]
            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = TrackerError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                let wanted = input.trim();
                <Self as Category>::ALL
                    .iter()
                    .copied()
                    .find(|category| category.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| TrackerError::invalid("category", input))
            }
        }
    };
}

define_categories! {
    /// Category of an income entry.
    IncomeCategory for Income {
        /// Regular employment pay.
        Salary => "Salary",
        /// Contract or gig work.
        Freelance => "Freelance",
        /// Business revenue.
        Business => "Business",
        /// Dividends, interest and capital gains.
        Investment => "Investment",
        /// Rent received.
        Rental => "Rental",
        /// Gifts received.
        Gift => "Gift",
        /// Anything else.
        Other => "Other",
    }
}

define_categories! {
    /// Category of an expense entry.
    ExpenseCategory for Expense {
        /// Rent, mortgage and upkeep.
        Housing => "Housing",
        /// Groceries and dining.
        Food => "Food",
        /// Fuel, fares and vehicle costs.
        Transportation => "Transportation",
        /// Electricity, water, gas and internet.
        Utilities => "Utilities",
        /// Medical costs.
        Healthcare => "Healthcare",
        /// Leisure.
        Entertainment => "Entertainment",
        /// General purchases.
        Shopping => "Shopping",
        /// Tuition, books and courses.
        Education => "Education",
        /// Anything else.
        Other => "Other",
    }
}
