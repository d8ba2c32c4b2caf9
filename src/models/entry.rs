//! Income and expense entry records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, EntryId, ExpenseCategory, IncomeCategory};

/// A single income or expense record.
///
/// `C` is the category enumeration of the owning collection, so an income
/// entry can never carry an expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry<C> {
    /// Unique identifier within the collection.
    pub id: EntryId,
    /// Free-text description (e.g. "Monthly Salary").
    pub source: String,
    /// Category from the collection's fixed set.
    pub category: C,
    /// Strictly positive amount.
    pub amount: Amount,
    /// Calendar date the money moved (yyyy-MM-dd).
    pub date: NaiveDate,
    /// When the entry was first recorded. Never changed by updates.
    pub created_at: DateTime<Utc>,
}

/// An income record.
pub type IncomeEntry = Entry<IncomeCategory>;
/// An expense record.
pub type ExpenseEntry = Entry<ExpenseCategory>;

impl<C: Copy> Entry<C> {
    /// Returns a draft pre-filled with this entry's fields and id, ready to
    /// be edited and saved back as an update.
    #[inline]
    #[must_use]
    pub fn to_draft(&self) -> EntryDraft<C> {
        EntryDraft {
            id: Some(self.id.clone()),
            source: self.source.clone(),
            category: Some(self.category),
            amount: Some(self.amount),
            date: Some(self.date),
        }
    }
}

/// Candidate entry as submitted by a form, before validation.
///
/// Every field except `source` may be missing. `id` is `None` to create
/// a new entry and `Some` to update an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft<C> {
    /// Id of the entry to update, or `None` to create.
    pub id: Option<EntryId>,
    /// Description; trimmed before it is stored.
    pub source: String,
    /// Selected category.
    pub category: Option<C>,
    /// Entered amount.
    pub amount: Option<Amount>,
    /// Entered date.
    pub date: Option<NaiveDate>,
}

/// Draft of an income record.
pub type IncomeDraft = EntryDraft<IncomeCategory>;
/// Draft of an expense record.
pub type ExpenseDraft = EntryDraft<ExpenseCategory>;

impl<C> EntryDraft<C> {
    /// Creates a fully populated draft for a new entry.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(source: T, category: C, amount: Amount, date: NaiveDate) -> Self {
        Self {
            id: None,
            source: source.into(),
            category: Some(category),
            amount: Some(amount),
            date: Some(date),
        }
    }

    /// Creates a draft with no fields filled in.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id: None,
            source: String::new(),
            category: None,
            amount: None,
            date: None,
        }
    }

    /// Targets an existing entry, turning the save into an update.
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = Some(id);
        self
    }
}
