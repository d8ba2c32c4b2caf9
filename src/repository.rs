//! Validation and identity rules for one entry collection.
//!
//! The functions here are generic over the [`Category`] set, so the
//! income and expense collections share one implementation. They only
//! touch the collection they are given; persisting the result is the
//! caller's job (see [`crate::tracker::Tracker`], which saves after every
//! successful mutation).

use core::fmt::Debug;
use core::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, TrackerError, ValidationError};
use crate::models::{Amount, Category, Entry, EntryDraft, EntryId};

/// How many fresh ids are tried before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 8;

/// Source of new entry ids.
pub trait IdGenerator: Debug + Send + Sync {
    /// Returns a new id. Should not repeat within a process.
    fn next_id(&self) -> EntryId;
}

/// Random UUIDv4 ids. The default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    #[inline]
    fn next_id(&self) -> EntryId {
        EntryId::new(Uuid::new_v4().to_string())
    }
}

/// Monotonic decimal ids (`"1"`, `"2"`, ...). Deterministic, for tests and
/// sample data.
#[derive(Debug, Default)]
pub struct SequentialIds {
    /// Last id handed out.
    last: AtomicU64,
}

impl SequentialIds {
    /// Creates a generator whose first id is `first`.
    #[inline]
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            last: AtomicU64::new(first.saturating_sub(1)),
        }
    }
}

impl IdGenerator for SequentialIds {
    #[inline]
    fn next_id(&self) -> EntryId {
        let next = self.last.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        EntryId::new(next.to_string())
    }
}

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date (UTC).
    #[inline]
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Draft fields after validation.
struct Checked<C> {
    /// Trimmed, non-empty source.
    source: String,
    /// Selected category.
    category: C,
    /// Positive amount.
    amount: Amount,
    /// Entry date.
    date: NaiveDate,
}

/// Extracts the draft fields, failing on the first missing or invalid one.
fn checked<C: Copy>(draft: &EntryDraft<C>) -> core::result::Result<Checked<C>, ValidationError> {
    let source = draft.source.trim();
    if source.is_empty() {
        return Err(ValidationError::MissingSource);
    }
    let category = draft.category.ok_or(ValidationError::MissingCategory)?;
    let amount = draft.amount.ok_or(ValidationError::MissingAmount)?;
    if !amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount);
    }
    if !amount.is_within_limit() {
        return Err(ValidationError::AmountTooLarge);
    }
    let date = draft.date.ok_or(ValidationError::MissingDate)?;
    Ok(Checked {
        source: source.to_owned(),
        category,
        amount,
        date,
    })
}

/// Checks a draft without touching any collection.
///
/// Checks run in this order and the first failure is returned: source
/// non-empty after trimming, category present, amount present, amount
/// greater than zero, amount at most [`Amount::MAX`], date present. Future
/// dates are accepted.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
#[inline]
pub fn validate<C: Copy>(draft: &EntryDraft<C>) -> core::result::Result<(), ValidationError> {
    checked(draft).map(|_fields| ())
}

/// Returns `true` if `date` lies after `today`.
///
/// The core accepts such dates; callers use this to decide whether to ask
/// the user for confirmation first.
#[inline]
#[must_use]
pub fn is_future_date(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

/// Creates or updates an entry from a draft.
///
/// - With no `draft.id`, a fresh id is generated, `created_at` is set to
///   `clock.now()` and the entry is appended.
/// - With `draft.id`, the matching entry's source, category, amount and
///   date are replaced in place; its `created_at` is kept.
///
/// Returns the resulting entry. On error the collection is unchanged.
///
/// # Errors
///
/// - [`TrackerError::Validation`] if the draft is invalid.
/// - [`TrackerError::NotFound`] if `draft.id` matches no entry.
/// - [`TrackerError::IdCollision`] if the generator only produced ids that
///   are already taken.
pub fn upsert<C: Category>(
    collection: &mut Vec<Entry<C>>,
    draft: EntryDraft<C>,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<Entry<C>> {
    let fields = checked(&draft)?;
    match draft.id {
        None => {
            let entry = Entry {
                id: fresh_id(collection, ids)?,
                source: fields.source,
                category: fields.category,
                amount: fields.amount,
                date: fields.date,
                created_at: clock.now(),
            };
            debug!(kind = %C::KIND, id = %entry.id, "created entry");
            collection.push(entry.clone());
            Ok(entry)
        }
        Some(id) => {
            let existing = collection
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| TrackerError::NotFound {
                    kind: C::KIND,
                    id: id.clone(),
                })?;
            existing.source = fields.source;
            existing.category = fields.category;
            existing.amount = fields.amount;
            existing.date = fields.date;
            debug!(kind = %C::KIND, id = %existing.id, "updated entry");
            Ok(existing.clone())
        }
    }
}

/// Removes the entry with the given id.
///
/// Returns the removed entry, or `None` if there was none. Removing an
/// absent id is not an error.
#[inline]
pub fn remove<C: Category>(collection: &mut Vec<Entry<C>>, id: &EntryId) -> Option<Entry<C>> {
    let pos = collection.iter().position(|entry| entry.id == *id)?;
    let removed = collection.remove(pos);
    debug!(kind = %C::KIND, id = %removed.id, "removed entry");
    Some(removed)
}

/// Looks up an entry by id.
#[inline]
#[must_use]
pub fn find_by_id<'a, C>(collection: &'a [Entry<C>], id: &EntryId) -> Option<&'a Entry<C>> {
    collection.iter().find(|entry| entry.id == *id)
}

/// Draws ids until one is unused in `collection`.
fn fresh_id<C: Category>(collection: &[Entry<C>], ids: &dyn IdGenerator) -> Result<EntryId> {
    for _attempt in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if find_by_id(collection, &candidate).is_none() {
            return Ok(candidate);
        }
        warn!(kind = %C::KIND, id = %candidate, "generated id already in use, retrying");
    }
    Err(TrackerError::IdCollision {
        attempts: MAX_ID_ATTEMPTS,
    })
}
