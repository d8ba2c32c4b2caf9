//! Data models for tracked income and expense entries.
//!
//! This module contains the entry record shared by both collections, the
//! per-collection category enumerations, fixed-point money, the display
//! currency table and the persisted state document.

mod category;
mod currency;
mod entry;
mod ids;
mod money;
mod state;

pub use category::{Category, EntryKind, ExpenseCategory, IncomeCategory};
pub use chrono::NaiveDate;
pub use currency::Currency;
pub use entry::{Entry, EntryDraft, ExpenseDraft, ExpenseEntry, IncomeDraft, IncomeEntry};
pub use ids::EntryId;
pub use money::{Amount, Percentage};
pub use state::State;
pub(crate) use state::StoredDocument;
