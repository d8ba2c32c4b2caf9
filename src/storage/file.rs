//! JSON-file-based storage backend.
//!
//! Stores the whole tracker state as one JSON document under a
//! configurable directory (default: `$XDG_DATA_HOME/fintrack/`).

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{decode, encode};
use crate::error::{Result, TrackerError};
use crate::models::State;

/// Application name used for the XDG data directory.
const APP_NAME: &str = "fintrack";

/// File name of the state document.
const STATE_FILE: &str = "tracker.json";
/// Temporary file the state is written to before the atomic rename.
const STATE_TMP_FILE: &str = "tracker.json.tmp";
/// Prefix of the file an undecodable document is renamed to.
const CORRUPT_PREFIX: &str = "tracker.json.corrupt-";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// File-backed storage that persists the tracker state as JSON.
///
/// # Atomicity
///
/// Saves write the full document to a temporary file and rename it over
/// the previous one, so a crash mid-write never leaves a half-written
/// document behind.
///
/// # Concurrency
///
/// An in-process [`Mutex`] serializes access within one process, and an
/// advisory lock on `storage.lock` serializes readers against writers
/// across processes. Two processes saving in turn still follow
/// last-writer-wins; there is no conflict detection.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock                             (cross-process lock sentinel)
///   tracker.json
///   tracker.json.corrupt-20250115T000000Z    (undecodable document, if any)
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing the state document.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/fintrack/` (typically
    /// `~/.local/share/fintrack/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                TrackerError::Storage("could not determine platform data directory".into())
            })
    }

    /// Returns the path of the state document.
    #[inline]
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads the raw document text, or `None` if it does not exist.
    fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.state_path()) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the document text (write-to-tmp then rename).
    fn write_raw(&self, json: &str) -> Result<()> {
        let tmp_path = self.dir.join(STATE_TMP_FILE);
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, self.state_path()).map_err(storage_io_error)?;
        Ok(())
    }
}

impl super::Storage for FileStorage {
    #[inline]
    fn load(&self) -> Result<State> {
        self.with_shared_lock(|| match self.read_raw()? {
            Some(raw) => decode(&raw).map(|doc| doc.state),
            None => {
                debug!(path = %self.state_path().display(), "no saved state, starting empty");
                Ok(State::default())
            }
        })
    }

    #[inline]
    fn save(&self, state: &State, at: DateTime<Utc>) -> Result<()> {
        let json = encode(state, at)?;
        self.with_exclusive_lock(|| self.write_raw(&json))?;
        debug!(
            income = state.income.len(),
            expenses = state.expenses.len(),
            "saved state"
        );
        Ok(())
    }

    #[inline]
    fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        self.with_shared_lock(|| match self.read_raw()? {
            Some(raw) => decode(&raw).map(|doc| doc.last_updated),
            None => Ok(None),
        })
    }

    /// Renames the state document to `tracker.json.corrupt-<UTC stamp>`.
    #[inline]
    fn preserve_corrupt(&self, at: DateTime<Utc>) -> Result<Option<String>> {
        let backup = self
            .dir
            .join(format!("{CORRUPT_PREFIX}{}", at.format("%Y%m%dT%H%M%SZ")));
        self.with_exclusive_lock(|| match fs::rename(self.state_path(), &backup) {
            Ok(()) => {
                warn!(path = %backup.display(), "moved undecodable state aside");
                Ok(Some(backup.display().to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        })
    }

    /// Deletes the state document.
    ///
    /// The `storage.lock` sentinel is preserved; it is infrastructure,
    /// not data.
    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_exclusive_lock(|| match fs::remove_file(self.state_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_io_error(err)),
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into a [`TrackerError::Storage`].
fn storage_io_error(err: std::io::Error) -> TrackerError {
    TrackerError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`TrackerError::Storage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> TrackerError {
    TrackerError::Storage(err.to_string().into())
}
