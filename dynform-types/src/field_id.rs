use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Identifier of a field, e.g. `"fullName"`.
///
/// Used as keys in `Answers`. Unique within a section; the engine does not
/// enforce uniqueness across sections.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create a new field id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for FieldId {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}

impl From<&FieldId> for FieldId {
    fn from(id: &FieldId) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let id = FieldId::new("fullName");
        assert_eq!(format!("{}", id), "fullName");
    }

    #[test]
    fn from_str() {
        let id: FieldId = "email".into();
        assert_eq!(id.as_str(), "email");
        assert!(!id.is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = FieldId::new("phone");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"phone\"");

        let back: FieldId = serde_json::from_str("\"phone\"").unwrap();
        assert_eq!(back, id);
    }
}
