//! The full tracker state and its persisted document form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Currency, ExpenseEntry, IncomeEntry};

/// Both collections plus the display currency.
///
/// Owned by the session and passed explicitly to the repository, filter
/// and summary functions. Persisted as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    /// Income collection.
    pub income: Vec<IncomeEntry>,
    /// Expense collection.
    pub expenses: Vec<ExpenseEntry>,
    /// Selected display currency.
    pub currency: Currency,
}

impl State {
    /// Returns `true` if neither collection has any entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expenses.is_empty()
    }
}

/// On-disk layout: the state fields plus a save timestamp.
///
/// Missing fields fall back to their defaults so partially written or
/// older documents still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredDocument {
    /// The tracked data.
    #[serde(flatten)]
    pub(crate) state: State,
    /// When the document was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl StoredDocument {
    /// Wraps a state snapshot stamped with the given save time.
    pub(crate) fn stamped(state: State, at: DateTime<Utc>) -> Self {
        Self {
            state,
            last_updated: Some(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, EntryId, IncomeCategory, NaiveDate};

    #[test]
    fn empty_object_loads_as_default() {
        let doc: StoredDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.state, State::default());
        assert!(doc.last_updated.is_none());
    }

    #[test]
    fn document_flattens_state_fields() {
        let mut state = State::default();
        state.income.push(IncomeEntry {
            id: EntryId::from("1"),
            source: "Monthly Salary".to_owned(),
            category: IncomeCategory::Salary,
            amount: Amount::from_major(80_000),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: DateTime::from_timestamp(1_735_689_600, 0).unwrap(),
        });
        let at = DateTime::from_timestamp(1_735_700_000, 0).unwrap();
        let value = serde_json::to_value(StoredDocument::stamped(state.clone(), at)).unwrap();

        assert_eq!(value["currency"], "BDT");
        assert_eq!(value["income"][0]["source"], "Monthly Salary");
        assert!(value["expenses"].as_array().unwrap().is_empty());
        assert!(value["lastUpdated"].is_string());

        let back: StoredDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back.state, state);
        assert_eq!(back.last_updated, Some(at));
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let doc: StoredDocument = serde_json::from_str(r#"{"currency":"USD"}"#).unwrap();
        assert!(doc.state.is_empty());
        assert_eq!(doc.state.currency, Currency::Usd);
    }
}
