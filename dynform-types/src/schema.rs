use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{FieldId, SchemaError};

/// The wire envelope returned by the form endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    /// Informational message from the server.
    #[serde(default)]
    pub message: String,

    /// The form itself.
    pub form: FormSchema,
}

/// The top-level form structure: ordered sections of fields.
///
/// Immutable once fetched. Section order is navigation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    /// Title shown above the form.
    #[serde(rename = "formTitle")]
    pub title: String,

    /// Server-side identifier of the form.
    pub form_id: String,

    /// Schema version, echoed back with the final payload.
    pub version: String,

    /// The sections, in navigation order.
    pub sections: Vec<Section>,
}

impl FormSchema {
    /// Create a new schema with the given sections.
    pub fn new(
        title: impl Into<String>,
        form_id: impl Into<String>,
        version: impl Into<String>,
        sections: Vec<Section>,
    ) -> Self {
        Self {
            title: title.into(),
            form_id: form_id.into(),
            version: version.into(),
            sections,
        }
    }

    /// Get a section by index.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the schema has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Check the structural invariants the engine relies on.
    ///
    /// Field ids must be unique within a section and option values unique within
    /// a field. Reusing a field id in a later section is allowed (the later
    /// section's answer overwrites the earlier one) and only logged.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.sections.is_empty() {
            return Err(SchemaError::NoSections);
        }

        let mut first_seen: HashMap<&FieldId, u32> = HashMap::new();
        for section in &self.sections {
            let mut in_section = HashSet::new();
            for field in &section.fields {
                if !in_section.insert(&field.field_id) {
                    return Err(SchemaError::DuplicateField {
                        section: section.section_id,
                        field: field.field_id.clone(),
                    });
                }

                let mut option_values = HashSet::new();
                for option in &field.options {
                    if !option_values.insert(option.value.as_str()) {
                        return Err(SchemaError::DuplicateOption {
                            field: field.field_id.clone(),
                            value: option.value.clone(),
                        });
                    }
                }

                if let Some(earlier) = first_seen.get(&field.field_id) {
                    tracing::warn!(
                        field = %field.field_id,
                        earlier_section = earlier,
                        section = section.section_id,
                        "field id reused across sections; later answer overwrites earlier one"
                    );
                } else {
                    first_seen.insert(&field.field_id, section.section_id);
                }
            }
        }

        Ok(())
    }
}

/// One page of the form, validated as a unit before navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldSpec>,
}

impl Section {
    /// Create a new section with the given fields.
    pub fn new(section_id: u32, title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            section_id,
            title: title.into(),
            description: String::new(),
            fields,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Find a field by id.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field_id.as_str() == id)
    }
}

/// The input type of a field.
///
/// Unknown type names coming from the server are kept as `Unsupported` so the
/// form can still render; such fields show a placeholder and hold no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Tel,
    Email,
    Textarea,
    Date,
    Dropdown,
    Radio,
    Checkbox,
    Unsupported(String),
}

impl FieldType {
    /// The wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Tel => "tel",
            Self::Email => "email",
            Self::Textarea => "textarea",
            Self::Date => "date",
            Self::Dropdown => "dropdown",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Unsupported(name) => name,
        }
    }

    /// Check if fields of this type hold a string.
    pub fn is_textual(&self) -> bool {
        !matches!(self, Self::Checkbox | Self::Unsupported(_))
    }

    /// Check if fields of this type pick from `options`.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Radio)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => Self::Text,
            "tel" => Self::Tel,
            "email" => Self::Email,
            "textarea" => Self::Textarea,
            "date" => Self::Date,
            "dropdown" => Self::Dropdown,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            _ => Self::Unsupported(name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        kind.as_str().to_string()
    }
}

/// Custom validation attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomValidation {
    pub message: String,
}

/// One selectable option of a dropdown or radio field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_test_id: Option<String>,
}

impl FieldOption {
    /// Create a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            data_test_id: None,
        }
    }
}

/// Declarative description of one input control and its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub field_id: FieldId,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<CustomValidation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_test_id: Option<String>,
}

impl FieldSpec {
    /// Create an optional field with no constraints.
    pub fn new(
        field_id: impl Into<FieldId>,
        field_type: impl Into<FieldType>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field_type: field_type.into(),
            label: label.into(),
            placeholder: None,
            required: false,
            min_length: None,
            max_length: None,
            validation: None,
            options: Vec::new(),
            data_test_id: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the minimum text length.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum text length.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set a custom validation message.
    pub fn with_custom_message(mut self, message: impl Into<String>) -> Self {
        self.validation = Some(CustomValidation {
            message: message.into(),
        });
        self
    }

    /// Set the selectable options.
    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// The custom validation message, if one is configured and non-empty.
    pub fn custom_validation_message(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .map(|v| v.message.as_str())
            .filter(|m| !m.is_empty())
    }

    /// Find the option carrying the given value.
    pub fn option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_JSON: &str = r#"{
        "message": "Form fetched successfully",
        "form": {
            "formTitle": "Student Information Form",
            "formId": "student-info-v1",
            "version": "1.0",
            "sections": [
                {
                    "sectionId": 1,
                    "title": "Personal Details",
                    "description": "Basic personal information",
                    "fields": [
                        {
                            "fieldId": "firstName",
                            "type": "text",
                            "label": "First Name",
                            "placeholder": "Enter your first name",
                            "required": true,
                            "dataTestId": "text-firstName",
                            "validation": { "message": "First name is required" },
                            "minLength": 2,
                            "maxLength": 50
                        },
                        {
                            "fieldId": "gender",
                            "type": "radio",
                            "label": "Gender",
                            "required": true,
                            "dataTestId": "gender-radio",
                            "options": [
                                { "value": "male", "label": "Male", "dataTestId": "gender-male" },
                                { "value": "female", "label": "Female" }
                            ]
                        },
                        {
                            "fieldId": "signature",
                            "type": "file",
                            "label": "Signature",
                            "required": false,
                            "dataTestId": "file-signature"
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn parses_form_response() {
        let response: FormResponse = serde_json::from_str(FORM_JSON).unwrap();
        let form = response.form;

        assert_eq!(response.message, "Form fetched successfully");
        assert_eq!(form.title, "Student Information Form");
        assert_eq!(form.form_id, "student-info-v1");
        assert_eq!(form.len(), 1);

        let section = form.section(0).unwrap();
        assert_eq!(section.section_id, 1);
        assert_eq!(section.fields.len(), 3);

        let first = &section.fields[0];
        assert_eq!(first.field_type, FieldType::Text);
        assert_eq!(first.min_length, Some(2));
        assert_eq!(first.max_length, Some(50));
        assert_eq!(first.custom_validation_message(), Some("First name is required"));
        assert_eq!(first.data_test_id.as_deref(), Some("text-firstName"));

        let gender = section.field("gender").unwrap();
        assert_eq!(gender.options.len(), 2);
        assert_eq!(gender.options[0].data_test_id.as_deref(), Some("gender-male"));
        assert!(gender.option("female").is_some());
    }

    #[test]
    fn unknown_type_is_kept() {
        let response: FormResponse = serde_json::from_str(FORM_JSON).unwrap();
        let signature = response.form.sections[0].field("signature").unwrap();

        assert_eq!(
            signature.field_type,
            FieldType::Unsupported("file".to_string())
        );
        assert_eq!(signature.field_type.as_str(), "file");
        assert!(!signature.field_type.is_supported());
    }

    #[test]
    fn type_names_round_trip() {
        for name in [
            "text", "tel", "email", "textarea", "date", "dropdown", "radio", "checkbox",
        ] {
            assert_eq!(FieldType::from(name).as_str(), name);
        }
    }

    #[test]
    fn empty_custom_message_is_ignored() {
        let field = FieldSpec::new("a", "text", "A").with_custom_message("");
        assert_eq!(field.custom_validation_message(), None);
    }

    #[test]
    fn check_rejects_empty_schema() {
        let schema = FormSchema::new("T", "f", "1", vec![]);
        assert!(matches!(schema.check(), Err(SchemaError::NoSections)));
    }

    #[test]
    fn check_rejects_duplicate_field_in_section() {
        let schema = FormSchema::new(
            "T",
            "f",
            "1",
            vec![Section::new(
                1,
                "S",
                vec![
                    FieldSpec::new("a", "text", "A"),
                    FieldSpec::new("a", "email", "A again"),
                ],
            )],
        );
        assert!(matches!(
            schema.check(),
            Err(SchemaError::DuplicateField { section: 1, .. })
        ));
    }

    #[test]
    fn check_rejects_duplicate_option_values() {
        let schema = FormSchema::new(
            "T",
            "f",
            "1",
            vec![Section::new(
                1,
                "S",
                vec![FieldSpec::new("pick", "dropdown", "Pick").with_options(vec![
                    FieldOption::new("x", "X"),
                    FieldOption::new("x", "Also X"),
                ])],
            )],
        );
        assert!(matches!(
            schema.check(),
            Err(SchemaError::DuplicateOption { .. })
        ));
    }

    #[test]
    fn check_allows_reuse_across_sections() {
        let schema = FormSchema::new(
            "T",
            "f",
            "1",
            vec![
                Section::new(1, "One", vec![FieldSpec::new("email", "email", "Email")]),
                Section::new(2, "Two", vec![FieldSpec::new("email", "email", "Email")]),
            ],
        );
        assert!(schema.check().is_ok());
    }
}
