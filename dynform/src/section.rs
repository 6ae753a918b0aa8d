use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::render::{FieldInput, RenderError, bind_input, empty_value};
use crate::{
    Answers, FieldId, FieldSpec, FieldType, FieldValue, RuleSet, Section, ValidationResult,
};

/// Wire format of date answers.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error type for writing a value into a section.
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("Field '{field}' has unsupported type '{type_name}'")]
    UnsupportedField { field: FieldId, type_name: String },

    #[error("Field '{field}' expects a {expected} value, got {actual}")]
    ShapeMismatch {
        field: FieldId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("'{value}' is not a valid date for field '{field}' (expected YYYY-MM-DD)")]
    InvalidDate { field: FieldId, value: String },

    #[error("'{value}' is not an option of field '{field}'")]
    UnknownOption { field: FieldId, value: String },

    #[error(transparent)]
    Input(#[from] RenderError),
}

/// A section that failed validation on submit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) need attention", .errors.len())]
pub struct SectionRejected {
    /// Failing fields and their messages, in field order.
    pub errors: Vec<(FieldId, String)>,
}

impl SectionRejected {
    /// The message for a field, if it failed.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(id, _)| id.as_str() == field)
            .map(|(_, message)| message.as_str())
    }
}

/// Owns the editable state of the section being shown.
///
/// Every supported field starts at its empty default and is validated right
/// away, so `is_valid` is meaningful before any edit. Unsupported fields hold
/// no value and take no part in validation.
#[derive(Debug, Clone)]
pub struct SectionController {
    section: Section,
    rules: HashMap<FieldId, RuleSet>,
    values: Answers,
    results: HashMap<FieldId, ValidationResult>,
    touched: HashSet<FieldId>,
    valid: bool,
}

impl SectionController {
    pub fn new(section: Section) -> Self {
        let mut values = Answers::new();
        let mut rules = HashMap::new();
        for field in &section.fields {
            if let Some(empty) = empty_value(field) {
                values.insert(&field.field_id, empty);
                rules.insert(field.field_id.clone(), RuleSet::for_field(field));
            }
        }

        let mut controller = Self {
            section,
            rules,
            values,
            results: HashMap::new(),
            touched: HashSet::new(),
            valid: false,
        };
        controller.validate_all();
        controller
    }

    /// Store a value for a field and revalidate it.
    ///
    /// On error the stored values are left untouched.
    pub fn set_value(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<&ValidationResult, SectionError> {
        let value = value.into();
        let spec = self.writable_field(field)?;
        check_shape(spec, &value)?;
        let id = spec.field_id.clone();

        let result = self.rules[&id].evaluate(Some(&value));
        self.values.insert(id.clone(), value);
        self.touched.insert(id.clone());
        self.results.insert(id.clone(), result);
        self.refresh_valid();

        Ok(&self.results[&id])
    }

    /// Bind a control interaction and store the resulting value.
    pub fn apply_input(
        &mut self,
        field: &str,
        input: FieldInput,
    ) -> Result<&ValidationResult, SectionError> {
        let spec = self
            .section
            .field(field)
            .ok_or_else(|| SectionError::UnknownField(field.into()))?;
        let value = bind_input(spec, input)?;
        self.set_value(field, value)
    }

    /// Validate every field and hand out the section's values if all pass.
    ///
    /// A rejected submit reveals every error but keeps the values as they are.
    pub fn try_submit(&mut self) -> Result<Answers, SectionRejected> {
        self.validate_all();
        self.touched.extend(self.rules.keys().cloned());

        if self.valid {
            Ok(self.values.clone())
        } else {
            Err(SectionRejected {
                errors: self.errors(),
            })
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn values(&self) -> &Answers {
        &self.values
    }

    /// Current validation result of a supported field.
    pub fn result(&self, field: &str) -> Option<&ValidationResult> {
        self.results.get(field)
    }

    /// Check if every field of the section passes validation.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current failures in field order.
    pub fn errors(&self) -> Vec<(FieldId, String)> {
        self.section
            .fields
            .iter()
            .filter_map(|field| {
                let message = self.results.get(&field.field_id)?.message()?;
                Some((field.field_id.clone(), message.to_string()))
            })
            .collect()
    }

    /// The error to display for a field: only once it was edited or a submit
    /// was attempted.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if !self.touched.contains(field) {
            return None;
        }
        self.results.get(field)?.message()
    }

    fn writable_field(&self, field: &str) -> Result<&FieldSpec, SectionError> {
        let spec = self
            .section
            .field(field)
            .ok_or_else(|| SectionError::UnknownField(field.into()))?;
        if !spec.field_type.is_supported() {
            return Err(SectionError::UnsupportedField {
                field: spec.field_id.clone(),
                type_name: spec.field_type.as_str().to_string(),
            });
        }
        Ok(spec)
    }

    fn validate_all(&mut self) {
        self.results = self
            .rules
            .iter()
            .map(|(id, rules)| (id.clone(), rules.evaluate(self.values.get(id.as_str()))))
            .collect();
        self.refresh_valid();
    }

    fn refresh_valid(&mut self) {
        self.valid = self.results.values().all(ValidationResult::is_valid);
    }
}

fn check_shape(spec: &FieldSpec, value: &FieldValue) -> Result<(), SectionError> {
    let expected = if spec.field_type.is_textual() {
        "Text"
    } else {
        "Bool"
    };
    if value.type_name() != expected {
        return Err(SectionError::ShapeMismatch {
            field: spec.field_id.clone(),
            expected,
            actual: value.type_name(),
        });
    }

    // Empty means no date picked yet.
    if let Some(text) = value.as_str()
        && spec.field_type == FieldType::Date
        && !text.is_empty()
        && !is_iso_date(text)
    {
        return Err(SectionError::InvalidDate {
            field: spec.field_id.clone(),
            value: text.to_string(),
        });
    }

    // An empty selection is the dropdown's placeholder state.
    if let Some(text) = value.as_str()
        && spec.field_type.has_options()
        && !text.is_empty()
        && spec.option(text).is_none()
    {
        return Err(SectionError::UnknownOption {
            field: spec.field_id.clone(),
            value: text.to_string(),
        });
    }

    Ok(())
}

/// Check for a real calendar date in `YYYY-MM-DD` form.
pub fn is_iso_date(text: &str) -> bool {
    text.len() == 10 && NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}
