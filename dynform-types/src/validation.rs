//! Field-level validation derived from a field's schema.
//!
//! Rules are evaluated in a fixed order and the first failing rule decides the
//! message:
//!
//! 1. required and empty: `"<label> is required"`
//! 2. shorter than `minLength`: `"Min <n> characters required"`
//! 3. longer than `maxLength`: `"Max <n> characters allowed"`
//! 4. custom message, required and empty: the custom message
//!
//! Rule 4 is shadowed by rule 1 whenever both are derived.

use crate::{FieldSpec, FieldType, FieldValue};

/// Outcome of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            error_message: None,
        }
    }

    /// A failing result with the message shown under the control.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error_message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// A single check derived from a field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty.
    Required { message: String },

    /// Text must have at least `min` characters.
    MinLength { min: usize, message: String },

    /// Text must have at most `max` characters.
    MaxLength { max: usize, message: String },

    /// Custom message reported for a required field left empty.
    CustomRequired { required: bool, message: String },
}

impl Rule {
    /// Returns the failure message if `value` breaks this rule.
    fn check(&self, value: Option<&FieldValue>) -> Option<&str> {
        let empty = value.is_none_or(FieldValue::is_empty);
        match self {
            Self::Required { message } => empty.then_some(message.as_str()),
            // Length rules never apply to empty or boolean values.
            Self::MinLength { min, message } => match value.and_then(FieldValue::text_len) {
                Some(len) if len > 0 && len < *min => Some(message.as_str()),
                _ => None,
            },
            Self::MaxLength { max, message } => match value.and_then(FieldValue::text_len) {
                Some(len) if len > *max => Some(message.as_str()),
                _ => None,
            },
            Self::CustomRequired { required, message } => {
                (*required && empty).then_some(message.as_str())
            }
        }
    }
}

/// The ordered rules for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Derive the rules for a field.
    pub fn for_field(field: &FieldSpec) -> Self {
        let mut rules = Vec::new();

        if field.required {
            rules.push(Rule::Required {
                message: format!("{} is required", field.label),
            });
        }

        if field.field_type != FieldType::Checkbox {
            // A zero bound means "not set".
            if let Some(min) = field.min_length.filter(|&n| n > 0) {
                rules.push(Rule::MinLength {
                    min,
                    message: format!("Min {min} characters required"),
                });
            }
            if let Some(max) = field.max_length.filter(|&n| n > 0) {
                rules.push(Rule::MaxLength {
                    max,
                    message: format!("Max {max} characters allowed"),
                });
            }
        }

        if let Some(message) = field.custom_validation_message() {
            rules.push(Rule::CustomRequired {
                required: field.required,
                message: message.to_string(),
            });
        }

        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the rules in order; the first failure wins.
    pub fn evaluate(&self, value: Option<&FieldValue>) -> ValidationResult {
        self.rules
            .iter()
            .find_map(|rule| rule.check(value))
            .map_or_else(ValidationResult::ok, ValidationResult::invalid)
    }
}

/// Validate a candidate value against a field definition.
pub fn validate(field: &FieldSpec, value: Option<&FieldValue>) -> ValidationResult {
    RuleSet::for_field(field).evaluate(value)
}
