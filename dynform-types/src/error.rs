use crate::FieldId;

/// Structural problems found in a fetched schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The form has nothing to fill in.
    #[error("Form has no sections")]
    NoSections,

    /// A field id appears twice in one section.
    #[error("Duplicate field '{field}' in section {section}")]
    DuplicateField { section: u32, field: FieldId },

    /// An option value appears twice in one field.
    #[error("Duplicate option value '{value}' in field '{field}'")]
    DuplicateOption { field: FieldId, value: String },
}
