//! Error types for the fintrack library.

use crate::models::{EntryId, EntryKind};

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, TrackerError>;

/// All errors that can occur when using the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// The persisted state exists but cannot be decoded.
    ///
    /// Recoverable: [`crate::tracker::Tracker::open`] falls back to an
    /// empty state when it sees this.
    #[error("stored data is corrupt: {0}")]
    CorruptData(String),

    /// A candidate entry was rejected before any mutation happened.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An update referenced an id that is not in the collection.
    #[error("{kind} entry not found: {id}")]
    NotFound {
        /// Collection that was searched.
        kind: EntryKind,
        /// The id that was looked up.
        id: EntryId,
    },

    /// A user-supplied value could not be parsed.
    #[error("invalid {what}: {input:?}")]
    InvalidValue {
        /// Name of the expected value (e.g. `"amount"`).
        what: &'static str,
        /// The rejected input.
        input: String,
    },

    /// The id generator kept producing ids that are already taken.
    #[error("could not generate a unique id after {attempts} attempts")]
    IdCollision {
        /// Number of ids tried.
        attempts: usize,
    },

    /// CSV export failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    /// Builds an [`TrackerError::InvalidValue`] for the given input.
    #[inline]
    #[must_use]
    pub fn invalid(what: &'static str, input: &str) -> Self {
        Self::InvalidValue {
            what,
            input: input.to_owned(),
        }
    }
}

/// Reason a candidate entry failed validation.
///
/// Checks run in declaration order and the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Source/description is empty after trimming.
    #[error("please fill all fields: source is empty")]
    MissingSource,
    /// No category selected.
    #[error("please fill all fields: category is missing")]
    MissingCategory,
    /// No amount given.
    #[error("please fill all fields: amount is missing")]
    MissingAmount,
    /// Amount is zero or negative.
    #[error("amount must be greater than 0")]
    NonPositiveAmount,
    /// Amount exceeds [`crate::models::Amount::MAX`].
    #[error("amount must not exceed 9,999,999,999,999.99")]
    AmountTooLarge,
    /// No date given.
    #[error("please fill all fields: date is missing")]
    MissingDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = TrackerError::from(serde_err);
        assert!(matches!(err, TrackerError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn error_storage_display() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only");
        let err = TrackerError::Storage(Box::new(inner));
        let msg = err.to_string();
        assert!(msg.contains("storage error"));
        assert!(msg.contains("read only"));
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = TrackerError::from(ValidationError::NonPositiveAmount);
        assert_eq!(err.to_string(), "amount must be greater than 0");
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = TrackerError::NotFound {
            kind: EntryKind::Expense,
            id: EntryId::new("e-9".to_owned()),
        };
        assert_eq!(err.to_string(), "expense entry not found: e-9");
    }

    #[test]
    fn invalid_value_quotes_input() {
        let err = TrackerError::invalid("currency", "XYZ");
        assert_eq!(err.to_string(), r#"invalid currency: "XYZ""#);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrackerError>();
    }
}
