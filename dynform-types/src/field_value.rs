use serde::{Deserialize, Serialize};

/// A single value held for a field.
///
/// Text-like, date, dropdown and radio fields hold a string; checkboxes hold a
/// boolean. Serialized untagged, so a JSON payload carries plain strings and
/// booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A string value (text, tel, email, textarea, date, dropdown, radio).
    Text(String),

    /// A boolean value (checkbox).
    Bool(bool),
}

impl FieldValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// Try to get this value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    /// An empty string, `false`, counts as "no answer".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Bool(b) => !b,
        }
    }

    /// Character count for text values; `None` for booleans.
    pub fn text_len(&self) -> Option<usize> {
        self.as_str().map(|s| s.chars().count())
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Bool(_) => "Bool",
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from(false).is_empty());
        assert!(!FieldValue::from(" ").is_empty());
        assert!(!FieldValue::from(true).is_empty());
    }

    #[test]
    fn text_len_counts_characters() {
        assert_eq!(FieldValue::from("Ada").text_len(), Some(3));
        assert_eq!(FieldValue::from("Zoë").text_len(), Some(3));
        assert_eq!(FieldValue::from(true).text_len(), None);
    }

    #[test]
    fn untagged_json() {
        assert_eq!(
            serde_json::to_value(FieldValue::from("x")).unwrap(),
            serde_json::json!("x")
        );
        assert_eq!(
            serde_json::to_value(FieldValue::from(true)).unwrap(),
            serde_json::json!(true)
        );
    }
}
