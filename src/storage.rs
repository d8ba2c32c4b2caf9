//! Pluggable storage backends for persisting tracker state.
//!
//! The whole [`State`] is one unit: every save overwrites the previous
//! document in full, and a load returns either that document or the
//! default empty state.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

use alloc::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::error::{Result, TrackerError};
use crate::models::{Category, Entry, State, StoredDocument};

/// Durable backing medium for the tracker state.
///
/// All methods take `&self`; implementations use interior mutability
/// (e.g. `Mutex`) for thread-safe mutation.
pub trait Storage: core::fmt::Debug + Send + Sync {
    /// Reads the persisted state.
    ///
    /// Returns the default empty state if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrackerError::CorruptData`] if a document
    /// exists but cannot be decoded, or a storage error if the medium
    /// cannot be read.
    fn load(&self) -> Result<State>;

    /// Replaces the persisted state with `state`, stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    fn save(&self, state: &State, at: DateTime<Utc>) -> Result<()>;

    /// Returns the save timestamp of the persisted document.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Same as [`Storage::load`].
    fn last_updated(&self) -> Result<Option<DateTime<Utc>>>;

    /// Moves an undecodable document aside so that later saves cannot
    /// overwrite it.
    ///
    /// Returns where the document now lives, or `None` if there was
    /// nothing to move.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be moved.
    fn preserve_corrupt(&self, at: DateTime<Utc>) -> Result<Option<String>>;

    /// Removes the persisted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to write.
    fn clear(&self) -> Result<()>;
}

/// Decodes a stored document, mapping decode failures and entries that
/// break the entry rules to `CorruptData`.
fn decode(raw: &str) -> Result<StoredDocument> {
    let doc: StoredDocument =
        serde_json::from_str(raw).map_err(|err| TrackerError::CorruptData(err.to_string()))?;
    check_entries(&doc.state.income)?;
    check_entries(&doc.state.expenses)?;
    Ok(doc)
}

/// Rejects a collection holding an entry that could not have been saved:
/// blank source, amount outside `(0, Amount::MAX]`, or a repeated id.
fn check_entries<C: Category>(entries: &[Entry<C>]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for entry in entries {
        let problem = if entry.source.trim().is_empty() {
            Some("source is empty")
        } else if !entry.amount.is_positive() {
            Some("amount is not positive")
        } else if !entry.amount.is_within_limit() {
            Some("amount is too large")
        } else if !seen.insert(&entry.id) {
            Some("id is not unique")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(TrackerError::CorruptData(format!(
                "{} entry {}: {problem}",
                C::KIND,
                entry.id
            )));
        }
    }
    Ok(())
}

/// Encodes a state snapshot as the stored document text.
fn encode(state: &State, at: DateTime<Utc>) -> Result<String> {
    let doc = StoredDocument::stamped(state.clone(), at);
    serde_json::to_string_pretty(&doc).map_err(TrackerError::from)
}
