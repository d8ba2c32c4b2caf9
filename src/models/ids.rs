//! Newtype wrapper for entry identifiers.

use serde::{Deserialize, Serialize};

/// Opaque identifier of an income or expense entry.
///
/// Assigned once at creation and never changed afterwards. Ids are only
/// unique within their own collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new identifier from the given string.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for EntryId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_serde_is_plain_string() {
        let id = EntryId::new("1736899200000".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""1736899200000""#);
        let deserialized: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn entry_id_display() {
        let id = EntryId::from("abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn entry_id_into_inner() {
        let id = EntryId::new("e-1".to_owned());
        assert_eq!(id.as_inner(), "e-1");
        assert_eq!(id.into_inner(), "e-1");
    }
}
