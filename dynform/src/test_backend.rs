//! Backend for filling forms without user interaction.
//!
//! `ScriptedBackend` fills every field it has an answer for, section by
//! section, and advances the engine until the form is submitted.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynform::{FormBackend, FormEngine, MemorySink, ScriptedBackend};
//!
//! let mut engine = FormEngine::new(schema)?;
//! let mut sink = MemorySink::new();
//!
//! ScriptedBackend::new()
//!     .with_text("fullName", "Ada")
//!     .with_toggle("agree", true)
//!     .run(&mut engine, &mut sink)?;
//!
//! assert_eq!(sink.submissions().len(), 1);
//! ```

use std::collections::HashMap;

use crate::{
    Advance, EngineError, FieldId, FieldInput, FormBackend, FormEngine, RunOutcome,
    SubmissionSink,
};

/// A backend that answers from a script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    inputs: HashMap<FieldId, FieldInput>,
    retries: usize,
    cancel_at: Option<usize>,
}

/// Error type for ScriptedBackend.
#[derive(Debug, thiserror::Error)]
pub enum ScriptedError {
    #[error("Section {index} was rejected: {errors:?}")]
    Rejected {
        index: usize,
        errors: Vec<(FieldId, String)>,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ScriptedBackend {
    /// Create a backend with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer a field with a control interaction.
    pub fn with_input(mut self, field: impl Into<FieldId>, input: FieldInput) -> Self {
        self.inputs.insert(field.into(), input);
        self
    }

    /// Type text into a field.
    pub fn with_text(self, field: impl Into<FieldId>, text: impl Into<String>) -> Self {
        self.with_input(field, FieldInput::Text(text.into()))
    }

    /// Pick an option by index.
    pub fn with_choice(self, field: impl Into<FieldId>, index: usize) -> Self {
        self.with_input(field, FieldInput::Choose(index))
    }

    /// Set a checkbox.
    pub fn with_toggle(self, field: impl Into<FieldId>, checked: bool) -> Self {
        self.with_input(field, FieldInput::Toggle(checked))
    }

    /// Retry a refused submission up to `retries` times.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Give up when the section at `index` is reached.
    pub fn cancel_at(mut self, index: usize) -> Self {
        self.cancel_at = Some(index);
        self
    }

    fn fill_current(&self, engine: &mut FormEngine) -> Result<(), ScriptedError> {
        let fields: Vec<FieldId> = engine
            .current_section()
            .map(|section| section.fields.iter().map(|f| f.field_id.clone()).collect())
            .unwrap_or_default();

        for field in fields {
            if let Some(input) = self.inputs.get(&field) {
                engine.apply_input(field.as_str(), input.clone())?;
            }
        }
        Ok(())
    }
}

impl FormBackend for ScriptedBackend {
    type Error = ScriptedError;

    fn run<S: SubmissionSink>(
        &self,
        engine: &mut FormEngine,
        sink: &mut S,
    ) -> Result<RunOutcome, Self::Error> {
        let mut refused = loop {
            let Some(index) = engine.current_index() else {
                return Err(EngineError::Completed.into());
            };
            if self.cancel_at == Some(index) {
                return Ok(RunOutcome::Cancelled);
            }

            self.fill_current(engine)?;
            match engine.advance(sink) {
                Ok(Advance::Next(_)) => {}
                Ok(Advance::Submitted) => return Ok(RunOutcome::Submitted),
                Err(EngineError::Rejected(rejected)) => {
                    return Err(ScriptedError::Rejected {
                        index,
                        errors: rejected.errors,
                    });
                }
                Err(EngineError::Submission(e)) => break e,
                Err(e) => return Err(e.into()),
            }
        };

        for _ in 0..self.retries {
            match engine.retry_submission(sink) {
                Ok(_) => return Ok(RunOutcome::Submitted),
                Err(EngineError::Submission(e)) => refused = e,
                Err(e) => return Err(e.into()),
            }
        }

        Err(EngineError::Submission(refused).into())
    }
}
