//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! [`super::Storage`]. It keeps the serialized document text rather than
//! the live value, so loads go through the same decoding as the file
//! backend.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{decode, encode};
use crate::error::{Result, TrackerError};
use crate::models::State;

/// Thread-safe in-memory storage.
///
/// # Example
///
/// ```rust
/// use fintrack::storage::{InMemoryStorage, Storage};
///
/// let storage = InMemoryStorage::new();
/// assert!(storage.load().unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Serialized document, or `None` if nothing has been saved.
    raw: Mutex<Option<String>>,
    /// Documents moved aside by `preserve_corrupt`, oldest first.
    preserved: Mutex<Vec<String>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-seeded with raw document text.
    ///
    /// Useful for exercising decoding of hand-written or damaged data.
    #[inline]
    #[must_use]
    pub fn with_raw<T: Into<String>>(raw: T) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            preserved: Mutex::default(),
        }
    }

    /// Returns a copy of the raw document text, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    #[inline]
    pub fn raw(&self) -> Result<Option<String>> {
        Ok(self.guard()?.clone())
    }

    /// Returns the documents moved aside as corrupt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    #[inline]
    pub fn preserved(&self) -> Result<Vec<String>> {
        Ok(self.preserved.lock().map_err(|err| lock_error(&err))?.clone())
    }

    /// Acquires the inner lock.
    fn guard(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.raw.lock().map_err(|err| lock_error(&err))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> TrackerError {
    TrackerError::Storage(err.to_string().into())
}

impl super::Storage for InMemoryStorage {
    #[inline]
    fn load(&self) -> Result<State> {
        match self.guard()?.as_deref() {
            Some(raw) => decode(raw).map(|doc| doc.state),
            None => Ok(State::default()),
        }
    }

    #[inline]
    fn save(&self, state: &State, at: DateTime<Utc>) -> Result<()> {
        let json = encode(state, at)?;
        *self.guard()? = Some(json);
        Ok(())
    }

    #[inline]
    fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        match self.guard()?.as_deref() {
            Some(raw) => decode(raw).map(|doc| doc.last_updated),
            None => Ok(None),
        }
    }

    #[inline]
    fn preserve_corrupt(&self, _at: DateTime<Utc>) -> Result<Option<String>> {
        let mut raw = self.guard()?;
        let Some(document) = raw.take() else {
            return Ok(None);
        };
        let mut preserved = self.preserved.lock().map_err(|err| lock_error(&err))?;
        preserved.push(document);
        Ok(Some(format!("in-memory backup #{}", preserved.len())))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        *self.guard()? = None;
        Ok(())
    }
}
