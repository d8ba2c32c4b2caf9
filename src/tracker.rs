//! High-level tracker combining the record store with the repository,
//! filter and summary layers.
//!
//! A [`Tracker`] loads the state once when it is opened and writes the
//! whole state back after every successful mutation. Each mutation works
//! on a copy of the state; if the save fails, the in-memory state is left
//! exactly as it was.

use alloc::collections::BTreeMap;
use std::io;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Result, TrackerError};
use crate::export::write_csv;
use crate::filter::{YearMonth, filter_by_month, months_present, newest_first};
use crate::models::{
    Amount, Currency, EntryId, ExpenseCategory, ExpenseDraft, ExpenseEntry, IncomeCategory,
    IncomeDraft, IncomeEntry, State,
};
use crate::repository::{self, Clock, IdGenerator, SystemClock, UuidIds};
use crate::storage::Storage;
use crate::summary::{self, Flow, Summary};

/// Builder for constructing a [`Tracker`].
#[derive(Debug)]
pub struct TrackerBuilder<S: Storage> {
    /// Storage backend.
    storage: Option<S>,
    /// Id source for new entries.
    ids: Option<Box<dyn IdGenerator>>,
    /// Time source for `createdAt`, save stamps and "today".
    clock: Option<Box<dyn Clock>>,
}

impl<S: Storage> TrackerBuilder<S> {
    /// Sets the storage backend.
    #[inline]
    #[must_use]
    pub fn storage(mut self, storage: S) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Overrides the id generator. Defaults to [`UuidIds`].
    #[inline]
    #[must_use]
    pub fn ids<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    /// Overrides the clock. Defaults to [`SystemClock`].
    #[inline]
    #[must_use]
    pub fn clock<K: Clock + 'static>(mut self, clock: K) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Loads the persisted state and builds the tracker.
    ///
    /// A document that exists but cannot be decoded is not fatal. It is
    /// moved aside through [`Storage::preserve_corrupt`] and the tracker
    /// starts from the default empty state, reported through
    /// [`Tracker::recovered_from_corruption`].
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if no storage was provided, the
    /// medium cannot be read, or a corrupt document cannot be moved aside.
    pub fn open(self) -> Result<Tracker<S>> {
        let storage = self
            .storage
            .ok_or_else(|| TrackerError::Storage("storage backend is required".into()))?;
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));

        let mut backup = None;
        let (state, recovered) = match storage.load() {
            Ok(state) => (state, false),
            Err(TrackerError::CorruptData(reason)) => {
                backup = storage.preserve_corrupt(clock.now())?;
                tracing::warn!(
                    %reason,
                    backup = backup.as_deref().unwrap_or("none"),
                    "stored data is corrupt, starting from an empty state"
                );
                (State::default(), true)
            }
            Err(err) => return Err(err),
        };
        tracing::debug!(
            income = state.income.len(),
            expenses = state.expenses.len(),
            currency = %state.currency,
            "tracker opened"
        );

        Ok(Tracker {
            storage,
            ids: self.ids.unwrap_or_else(|| Box::new(UuidIds)),
            clock,
            state,
            recovered,
            backup,
        })
    }
}

/// Personal finance tracker over a [`Storage`] backend.
///
/// # Example
///
/// ```rust
/// use fintrack::models::{Amount, IncomeCategory, IncomeDraft, NaiveDate};
/// use fintrack::storage::InMemoryStorage;
/// use fintrack::tracker::Tracker;
///
/// let mut tracker = Tracker::builder()
///     .storage(InMemoryStorage::new())
///     .open()
///     .unwrap();
/// let salary = IncomeDraft::new(
///     "Monthly Salary",
///     IncomeCategory::Salary,
///     Amount::from_major(80_000),
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// );
/// tracker.save_income(salary).unwrap();
/// assert_eq!(tracker.summary(None).total_income, Amount::from_major(80_000));
/// ```
#[derive(Debug)]
pub struct Tracker<S: Storage> {
    /// Storage backend.
    storage: S,
    /// Id source for new entries.
    ids: Box<dyn IdGenerator>,
    /// Time source.
    clock: Box<dyn Clock>,
    /// Current state, identical to the last successful save.
    state: State,
    /// Whether `open` found an undecodable document.
    recovered: bool,
    /// Where that document was moved to.
    backup: Option<String>,
}

impl<S: Storage> Tracker<S> {
    /// Creates a new builder for configuring the tracker.
    #[inline]
    #[must_use]
    pub const fn builder() -> TrackerBuilder<S> {
        TrackerBuilder {
            storage: None,
            ids: None,
            clock: None,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Storage backend.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns `true` if the stored document was corrupt when the tracker
    /// was opened and an empty state was used instead.
    #[inline]
    #[must_use]
    pub const fn recovered_from_corruption(&self) -> bool {
        self.recovered
    }

    /// Where the corrupt document was moved to, if `open` found one.
    #[inline]
    #[must_use]
    pub fn corrupt_backup(&self) -> Option<&str> {
        self.backup.as_deref()
    }

    /// Today's date according to the tracker's clock.
    #[inline]
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Returns `true` if `date` is after today and should be confirmed
    /// before it is saved.
    #[inline]
    #[must_use]
    pub fn is_future_date(&self, date: NaiveDate) -> bool {
        repository::is_future_date(date, self.today())
    }

    /// Save stamp of the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to read.
    #[inline]
    pub fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        self.storage.last_updated()
    }

    /// Selected display currency.
    #[inline]
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.state.currency
    }

    /// Changes and persists the display currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn set_currency(&mut self, currency: Currency) -> Result<()> {
        let mut next = self.state.clone();
        next.currency = currency;
        self.commit(next)?;
        tracing::info!(%currency, "currency changed");
        Ok(())
    }

    /// Formats an amount in the selected currency.
    #[inline]
    #[must_use]
    pub fn format(&self, amount: Amount) -> String {
        self.state.currency.format(amount)
    }

    /// Creates or updates an income entry and persists the result.
    ///
    /// # Errors
    ///
    /// Returns a validation error, [`TrackerError::NotFound`] for an
    /// unknown id, or a storage error. On error nothing changes.
    pub fn save_income(&mut self, draft: IncomeDraft) -> Result<IncomeEntry> {
        let mut next = self.state.clone();
        let entry = repository::upsert(&mut next.income, draft, &*self.ids, &*self.clock)?;
        self.commit(next)?;
        tracing::info!(id = %entry.id, "income saved");
        Ok(entry)
    }

    /// Creates or updates an expense entry and persists the result.
    ///
    /// # Errors
    ///
    /// Same as [`Tracker::save_income`].
    pub fn save_expense(&mut self, draft: ExpenseDraft) -> Result<ExpenseEntry> {
        let mut next = self.state.clone();
        let entry = repository::upsert(&mut next.expenses, draft, &*self.ids, &*self.clock)?;
        self.commit(next)?;
        tracing::info!(id = %entry.id, "expense saved");
        Ok(entry)
    }

    /// Removes an income entry and persists the result.
    ///
    /// Returns the removed entry, or `None` if no entry had that id, in
    /// which case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn delete_income(&mut self, id: &EntryId) -> Result<Option<IncomeEntry>> {
        let mut next = self.state.clone();
        let Some(removed) = repository::remove(&mut next.income, id) else {
            tracing::debug!(%id, "income to delete not found");
            return Ok(None);
        };
        self.commit(next)?;
        tracing::info!(%id, "income deleted");
        Ok(Some(removed))
    }

    /// Removes an expense entry and persists the result.
    ///
    /// # Errors
    ///
    /// Same as [`Tracker::delete_income`].
    pub fn delete_expense(&mut self, id: &EntryId) -> Result<Option<ExpenseEntry>> {
        let mut next = self.state.clone();
        let Some(removed) = repository::remove(&mut next.expenses, id) else {
            tracing::debug!(%id, "expense to delete not found");
            return Ok(None);
        };
        self.commit(next)?;
        tracing::info!(%id, "expense deleted");
        Ok(Some(removed))
    }

    /// Looks up an income entry by id.
    #[inline]
    #[must_use]
    pub fn find_income(&self, id: &EntryId) -> Option<&IncomeEntry> {
        repository::find_by_id(&self.state.income, id)
    }

    /// Looks up an expense entry by id.
    #[inline]
    #[must_use]
    pub fn find_expense(&self, id: &EntryId) -> Option<&ExpenseEntry> {
        repository::find_by_id(&self.state.expenses, id)
    }

    /// Income entries of `month` (or all), most recent first.
    #[inline]
    #[must_use]
    pub fn income(&self, month: Option<YearMonth>) -> Vec<&IncomeEntry> {
        newest_first(filter_by_month(&self.state.income, month))
    }

    /// Expense entries of `month` (or all), most recent first.
    #[inline]
    #[must_use]
    pub fn expenses(&self, month: Option<YearMonth>) -> Vec<&ExpenseEntry> {
        newest_first(filter_by_month(&self.state.expenses, month))
    }

    /// Months with at least one entry, most recent first.
    #[inline]
    #[must_use]
    pub fn months(&self) -> Vec<YearMonth> {
        months_present(&self.state.income, &self.state.expenses)
    }

    /// Headline figures for `month` (or all time).
    #[must_use]
    pub fn summary(&self, month: Option<YearMonth>) -> Summary {
        Summary::compute(
            filter_by_month(&self.state.income, month),
            filter_by_month(&self.state.expenses, month),
        )
    }

    /// Per-day income and expense totals for `month` (or all time).
    #[must_use]
    pub fn daily_series(&self, month: Option<YearMonth>) -> BTreeMap<NaiveDate, Flow> {
        summary::daily_series(
            filter_by_month(&self.state.income, month),
            filter_by_month(&self.state.expenses, month),
        )
    }

    /// Expense totals per category for `month` (or all time).
    #[must_use]
    pub fn expense_breakdown(&self, month: Option<YearMonth>) -> BTreeMap<ExpenseCategory, Amount> {
        summary::group_by_category(filter_by_month(&self.state.expenses, month))
    }

    /// Income totals per category for `month` (or all time).
    #[must_use]
    pub fn income_breakdown(&self, month: Option<YearMonth>) -> BTreeMap<IncomeCategory, Amount> {
        summary::group_by_category(filter_by_month(&self.state.income, month))
    }

    /// Per-month totals over the full history, ignoring any month filter.
    #[must_use]
    pub fn monthly_history(&self) -> BTreeMap<YearMonth, Flow> {
        summary::group_by_month(&self.state.income, &self.state.expenses)
    }

    /// Writes the entries of `month` (or all) as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Csv`] if writing fails.
    pub fn export_csv<W: io::Write>(&self, month: Option<YearMonth>, writer: W) -> Result<()> {
        write_csv(
            writer,
            filter_by_month(&self.state.income, month),
            filter_by_month(&self.state.expenses, month),
        )
    }

    /// Replaces both collections with a small January 2025 data set.
    ///
    /// The selected currency is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn load_sample_data(&mut self) -> Result<()> {
        let created_at = self.clock.now();
        let next = State {
            currency: self.state.currency,
            ..sample_state(created_at)
        };
        self.commit(next)?;
        tracing::info!("sample data loaded");
        Ok(())
    }

    /// Removes every entry and persists the empty collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn clear_entries(&mut self) -> Result<()> {
        let next = State {
            currency: self.state.currency,
            ..State::default()
        };
        self.commit(next)?;
        tracing::info!("all entries removed");
        Ok(())
    }

    /// Saves `next` and installs it as the current state.
    fn commit(&mut self, next: State) -> Result<()> {
        self.storage.save(&next, self.clock.now())?;
        self.state = next;
        Ok(())
    }
}

/// Builds the sample data set.
fn sample_state(created_at: DateTime<Utc>) -> State {
    let day = |d: u32| NaiveDate::from_ymd_opt(2025, 1, d).unwrap_or_default();
    let income = |id: &str, source: &str, category, major, on| IncomeEntry {
        id: EntryId::from(id),
        source: source.to_owned(),
        category,
        amount: Amount::from_major(major),
        date: on,
        created_at,
    };
    let expense = |id: &str, source: &str, category, major, on| ExpenseEntry {
        id: EntryId::from(id),
        source: source.to_owned(),
        category,
        amount: Amount::from_major(major),
        date: on,
        created_at,
    };

    State {
        income: vec![
            income("1", "Monthly Salary", IncomeCategory::Salary, 80_000, day(1)),
            income("2", "Freelance Project", IncomeCategory::Freelance, 50_000, day(15)),
        ],
        expenses: vec![
            expense("1", "Apartment Rent", ExpenseCategory::Housing, 25_000, day(5)),
            expense("2", "Grocery Shopping", ExpenseCategory::Food, 12_000, day(10)),
            expense("3", "Electricity Bill", ExpenseCategory::Utilities, 3_500, day(12)),
        ],
        currency: Currency::default(),
    }
}
