use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{FieldId, FieldValue};

/// Error type for answer access operations.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("Missing answer for field: {0}")]
    MissingField(FieldId),

    #[error("Type mismatch at field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: FieldId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Field values keyed by field id, in first-insertion order.
///
/// Used both for the value store of a single section and for the answers
/// accumulated across every submitted section. Serializes as a flat JSON
/// object, which is the shape of the final payload. Overwriting a value keeps
/// the field's original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: IndexMap<FieldId, FieldValue>,
}

impl Answers {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Insert a value for the given field, returning the previous one.
    pub fn insert(
        &mut self,
        field: impl Into<FieldId>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.values.insert(field.into(), value.into())
    }

    /// Get the value for a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Check if a value exists for the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Get an iterator over all field-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldValue)> {
        self.values.iter()
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge another collection into this one. Entries of `other` win.
    pub fn extend(&mut self, other: Answers) {
        self.values.extend(other.values);
    }

    /// Get a text value for the given field.
    pub fn get_text(&self, field: &str) -> Result<&str, AnswerError> {
        match self.get(field) {
            Some(FieldValue::Text(s)) => Ok(s),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.into(),
                expected: "Text",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::MissingField(field.into())),
        }
    }

    /// Get a boolean value for the given field.
    pub fn get_bool(&self, field: &str) -> Result<bool, AnswerError> {
        match self.get(field) {
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.into(),
                expected: "Bool",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::MissingField(field.into())),
        }
    }

    /// Render the collection as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(id, value)| {
                let value = match value {
                    FieldValue::Text(s) => serde_json::Value::String(s.clone()),
                    FieldValue::Bool(b) => serde_json::Value::Bool(*b),
                };
                (id.to_string(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl IntoIterator for Answers {
    type Item = (FieldId, FieldValue);
    type IntoIter = indexmap::map::IntoIter<FieldId, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = (&'a FieldId, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, FieldId, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(FieldId, FieldValue)> for Answers {
    fn from_iter<T: IntoIterator<Item = (FieldId, FieldValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut answers = Answers::new();
        answers.insert("name", "Ada");
        answers.insert("agree", true);

        assert_eq!(answers.get_text("name").unwrap(), "Ada");
        assert!(answers.get_bool("agree").unwrap());
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn extend_is_last_write_wins() {
        let mut answers = Answers::new();
        answers.insert("email", "old@example.com");
        answers.insert("name", "Ada");

        let mut later = Answers::new();
        later.insert("email", "new@example.com");
        answers.extend(later);

        assert_eq!(answers.get_text("email").unwrap(), "new@example.com");
        assert_eq!(answers.get_text("name").unwrap(), "Ada");
    }

    #[test]
    fn keeps_first_insertion_order() {
        let mut answers = Answers::new();
        for id in ["zeta", "alpha", "mid"] {
            answers.insert(id, "");
        }
        let mut later = Answers::new();
        later.insert("beta", "b");
        later.insert("zeta", "z");
        answers.extend(later);

        let keys: Vec<&str> = answers.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid", "beta"]);
        assert_eq!(answers.get_text("zeta").unwrap(), "z");

        assert_eq!(
            serde_json::to_string(&answers).unwrap(),
            r#"{"zeta":"z","alpha":"","mid":"","beta":"b"}"#
        );
        assert_eq!(
            answers.to_json().to_string(),
            r#"{"zeta":"z","alpha":"","mid":"","beta":"b"}"#
        );
    }

    #[test]
    fn type_mismatch_error() {
        let mut answers = Answers::new();
        answers.insert("agree", true);

        let result = answers.get_text("agree");
        assert!(matches!(result, Err(AnswerError::TypeMismatch { .. })));
        assert!(matches!(
            answers.get_bool("missing"),
            Err(AnswerError::MissingField(_))
        ));
    }

    #[test]
    fn serializes_flat() {
        let mut answers = Answers::new();
        answers.insert("fullName", "Ada");
        answers.insert("agree", true);

        let json = serde_json::to_value(&answers).unwrap();
        assert_eq!(json, serde_json::json!({ "fullName": "Ada", "agree": true }));
        assert_eq!(answers.to_json(), json);
    }
}
