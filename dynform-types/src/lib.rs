//! Core types for the dynform crate.
//!
//! This crate provides the presentation-agnostic data model of a dynamic form:
//! - `FormSchema`, `Section`, `FieldSpec` - The declarative form structure
//! - `FieldId`, `FieldValue`, `Answers` - Collected values keyed by field
//! - `RuleSet` and `validate` - Per-field validation derived from the schema

mod field_id;
pub use field_id::FieldId;

mod field_value;
pub use field_value::FieldValue;

mod answers;
pub use answers::{AnswerError, Answers};

mod schema;
pub use schema::{
    CustomValidation, FieldOption, FieldSpec, FieldType, FormResponse, FormSchema, Section,
};

pub mod validation;
pub use validation::{Rule, RuleSet, ValidationResult, validate};

mod error;
pub use error::SchemaError;
