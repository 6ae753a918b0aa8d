//! Mapping from field specs to input controls.
//!
//! Frontends do not switch on the raw field type. They ask for a [`Control`],
//! draw it, and feed user interaction back as a [`FieldInput`], which
//! [`bind_input`] turns into the [`FieldValue`] stored by the section.

use crate::{FieldId, FieldOption, FieldSpec, FieldType, FieldValue, SectionController};

/// Placeholder shown by an empty dropdown when the schema gives none.
pub const DEFAULT_SELECT_PLACEHOLDER: &str = "Select an option";

/// Error type for turning control input into a value.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unsupported field type '{type_name}' for field '{field}'")]
    Unsupported { field: FieldId, type_name: String },

    #[error("Input does not fit the {type_name} control of field '{field}'")]
    InputMismatch { field: FieldId, type_name: String },

    #[error("Option {index} out of range for field '{field}' ({len} options)")]
    OptionOutOfRange {
        field: FieldId,
        index: usize,
        len: usize,
    },
}

/// Flavour of a single-line text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Text,
    Tel,
    Email,
}

/// Icon hint drawn next to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIcon {
    Text,
    Mail,
    Phone,
    Multiline,
    Calendar,
}

impl FieldIcon {
    /// Icon for a field type, if that type carries one.
    pub fn for_type(field_type: &FieldType) -> Option<Self> {
        match field_type {
            FieldType::Text => Some(Self::Text),
            FieldType::Email => Some(Self::Mail),
            FieldType::Tel => Some(Self::Phone),
            FieldType::Textarea => Some(Self::Multiline),
            FieldType::Date => Some(Self::Calendar),
            _ => None,
        }
    }

    /// A terminal-friendly glyph.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Text => "T",
            Self::Mail => "@",
            Self::Phone => "☎",
            Self::Multiline => "¶",
            Self::Calendar => "▦",
        }
    }
}

/// The input affordance for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Single-line text input.
    TextInput {
        kind: TextKind,
        placeholder: Option<String>,
    },

    /// Multi-line text input.
    TextArea { placeholder: Option<String> },

    /// Date input holding ISO date text.
    DateInput,

    /// Single choice from a collapsed list.
    Dropdown {
        options: Vec<FieldOption>,
        placeholder: String,
    },

    /// Single choice from an exclusive group.
    RadioGroup { options: Vec<FieldOption> },

    /// Boolean toggle.
    Checkbox,

    /// Visible placeholder for a type this engine does not know.
    Unsupported { type_name: String },
}

impl Control {
    /// Pick the control for a field.
    pub fn for_field(field: &FieldSpec) -> Self {
        match &field.field_type {
            FieldType::Text => Self::text(TextKind::Text, field),
            FieldType::Tel => Self::text(TextKind::Tel, field),
            FieldType::Email => Self::text(TextKind::Email, field),
            FieldType::Textarea => Self::TextArea {
                placeholder: field.placeholder.clone(),
            },
            FieldType::Date => Self::DateInput,
            FieldType::Dropdown => Self::Dropdown {
                options: field.options.clone(),
                placeholder: field
                    .placeholder
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SELECT_PLACEHOLDER.to_string()),
            },
            FieldType::Radio => Self::RadioGroup {
                options: field.options.clone(),
            },
            FieldType::Checkbox => Self::Checkbox,
            FieldType::Unsupported(name) => Self::Unsupported {
                type_name: name.clone(),
            },
        }
    }

    fn text(kind: TextKind, field: &FieldSpec) -> Self {
        Self::TextInput {
            kind,
            placeholder: field.placeholder.clone(),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// Check if the control edits free text.
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Self::TextInput { .. } | Self::TextArea { .. })
    }

    /// The selectable options of a dropdown or radio group.
    pub fn options(&self) -> &[FieldOption] {
        match self {
            Self::Dropdown { options, .. } | Self::RadioGroup { options } => options,
            _ => &[],
        }
    }
}

/// Empty default for a field, without building its control.
pub fn empty_value(field: &FieldSpec) -> Option<FieldValue> {
    match field.field_type {
        FieldType::Checkbox => Some(FieldValue::Bool(false)),
        FieldType::Unsupported(_) => None,
        _ => Some(FieldValue::Text(String::new())),
    }
}

/// User interaction with a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// New full text of a text, textarea, or date control.
    Text(String),

    /// Index of the chosen option of a dropdown or radio group.
    Choose(usize),

    /// New state of a checkbox.
    Toggle(bool),
}

/// Turn an interaction with a field's control into the value to store.
pub fn bind_input(field: &FieldSpec, input: FieldInput) -> Result<FieldValue, RenderError> {
    let mismatch = || RenderError::InputMismatch {
        field: field.field_id.clone(),
        type_name: field.field_type.as_str().to_string(),
    };

    match (&field.field_type, input) {
        (FieldType::Unsupported(name), _) => Err(RenderError::Unsupported {
            field: field.field_id.clone(),
            type_name: name.clone(),
        }),
        (FieldType::Dropdown | FieldType::Radio, FieldInput::Choose(index)) => field
            .options
            .get(index)
            .map(|option| FieldValue::Text(option.value.clone()))
            .ok_or(RenderError::OptionOutOfRange {
                field: field.field_id.clone(),
                index,
                len: field.options.len(),
            }),
        (FieldType::Checkbox, FieldInput::Toggle(checked)) => Ok(FieldValue::Bool(checked)),
        (
            FieldType::Text
            | FieldType::Tel
            | FieldType::Email
            | FieldType::Textarea
            | FieldType::Date,
            FieldInput::Text(text),
        ) => Ok(FieldValue::Text(text)),
        _ => Err(mismatch()),
    }
}

/// Everything a frontend needs to draw one field.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub field_id: FieldId,
    pub label: String,
    /// Draw the required marker.
    pub required: bool,
    pub control: Control,
    pub icon: Option<FieldIcon>,
    /// Current value; `None` for unsupported fields.
    pub value: Option<FieldValue>,
    /// Message shown directly under the control.
    pub error: Option<String>,
    pub data_test_id: Option<String>,
}

impl RenderedField {
    /// Index of the option matching the current value.
    pub fn selected_option(&self) -> Option<usize> {
        let value = self.value.as_ref()?.as_str()?;
        self.control.options().iter().position(|o| o.value == value)
    }

    /// Text shown in place of an unsupported control.
    pub fn unsupported_notice(&self) -> Option<String> {
        match &self.control {
            Control::Unsupported { type_name } => {
                Some(format!("Unsupported field type: {type_name}"))
            }
            _ => None,
        }
    }

    /// Current text, or an empty string for non-text values.
    pub fn text(&self) -> &str {
        self.value
            .as_ref()
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
    }

    /// Current checkbox state.
    pub fn checked(&self) -> bool {
        self.value
            .as_ref()
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }
}

/// Describe one field of the section held by `controller`.
pub fn render_field(field: &FieldSpec, controller: &SectionController) -> RenderedField {
    RenderedField {
        field_id: field.field_id.clone(),
        label: field.label.clone(),
        required: field.required,
        control: Control::for_field(field),
        icon: FieldIcon::for_type(&field.field_type),
        value: controller.value(field.field_id.as_str()).cloned(),
        error: controller
            .visible_error(field.field_id.as_str())
            .map(str::to_string),
        data_test_id: field.data_test_id.clone(),
    }
}

/// Describe every field of the current section, in order.
pub fn render_section(controller: &SectionController) -> Vec<RenderedField> {
    controller
        .section()
        .fields
        .iter()
        .map(|field| render_field(field, controller))
        .collect()
}
