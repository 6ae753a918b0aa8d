//! Multi-section navigation over a fetched schema.
//!
//! The engine walks the sections of a [`FormSchema`] in order. Moving forward
//! requires the current section to validate; its values are then merged into
//! the accumulated answers. Moving back discards unsaved edits of the section
//! being left. After the last section the accumulated answers are handed to a
//! [`SubmissionSink`] exactly once, unless the sink refuses and the caller
//! retries.

use crate::render::FieldInput;
use crate::section::{SectionController, SectionError, SectionRejected};
use crate::sink::{Submission, SubmissionSink};
use crate::{Answers, FieldValue, FormSchema, SchemaError, Section, ValidationResult};

/// Where the engine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Showing the section at this index.
    Filling(usize),

    /// Every section was submitted.
    Completed,
}

/// Outcome of a successful [`FormEngine::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the section at this index.
    Next(usize),

    /// The last section was accepted and the payload delivered.
    Submitted,
}

/// Position of a section relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Done,
    Current,
    Upcoming,
}

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Section is not valid: {0}")]
    Rejected(#[from] SectionRejected),

    #[error("Submission failed: {0}")]
    Submission(anyhow::Error),

    #[error("Form is already completed")]
    Completed,

    #[error("Already at the first section")]
    AtFirstSection,

    #[error("Form was already submitted")]
    AlreadySubmitted,

    #[error("Form has sections left to fill")]
    NotCompleted,

    #[error(transparent)]
    Field(#[from] SectionError),
}

/// Drives one user through one form.
#[derive(Debug)]
pub struct FormEngine {
    schema: FormSchema,
    state: FormState,
    controller: Option<SectionController>,
    answers: Answers,
    acknowledged: bool,
}

impl FormEngine {
    /// Start at the first section of a structurally valid schema.
    pub fn new(schema: FormSchema) -> Result<Self, SchemaError> {
        schema.check()?;
        let controller = SectionController::new(schema.sections[0].clone());

        tracing::debug!(
            form_id = %schema.form_id,
            sections = schema.len(),
            "form engine started"
        );

        Ok(Self {
            schema,
            state: FormState::Filling(0),
            controller: Some(controller),
            answers: Answers::new(),
            acknowledged: false,
        })
    }

    /// Accept the current section and move on, or submit after the last one.
    pub fn advance<S: SubmissionSink>(&mut self, sink: &mut S) -> Result<Advance, EngineError> {
        let FormState::Filling(index) = self.state else {
            return Err(EngineError::Completed);
        };
        let controller = self.controller.as_mut().ok_or(EngineError::Completed)?;

        let values = match controller.try_submit() {
            Ok(values) => values,
            Err(rejected) => {
                tracing::debug!(
                    section = index,
                    failures = rejected.errors.len(),
                    "section rejected"
                );
                return Err(rejected.into());
            }
        };
        self.answers.extend(values);

        if index + 1 < self.schema.len() {
            let next = index + 1;
            self.enter(next);
            tracing::info!(from = index, to = next, "section advanced");
            return Ok(Advance::Next(next));
        }

        self.state = FormState::Completed;
        self.controller = None;
        tracing::info!(
            form_id = %self.schema.form_id,
            answers = self.answers.len(),
            "form completed"
        );
        self.deliver(sink)
    }

    /// Resubmit the held answers after the sink refused them.
    pub fn retry_submission<S: SubmissionSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<Advance, EngineError> {
        if self.state != FormState::Completed {
            return Err(EngineError::NotCompleted);
        }
        if self.acknowledged {
            return Err(EngineError::AlreadySubmitted);
        }
        self.deliver(sink)
    }

    /// Go back one section, dropping unsaved edits of the current one.
    pub fn retreat(&mut self) -> Result<usize, EngineError> {
        match self.state {
            FormState::Completed => Err(EngineError::Completed),
            FormState::Filling(0) => Err(EngineError::AtFirstSection),
            FormState::Filling(index) => {
                let previous = index - 1;
                self.enter(previous);
                tracing::info!(from = index, to = previous, "section retreated");
                Ok(previous)
            }
        }
    }

    /// Store a value in the current section.
    pub fn set_value(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<&ValidationResult, EngineError> {
        let controller = self.controller.as_mut().ok_or(EngineError::Completed)?;
        Ok(controller.set_value(field, value)?)
    }

    /// Apply a control interaction to the current section.
    pub fn apply_input(
        &mut self,
        field: &str,
        input: FieldInput,
    ) -> Result<&ValidationResult, EngineError> {
        let controller = self.controller.as_mut().ok_or(EngineError::Completed)?;
        Ok(controller.apply_input(field, input)?)
    }

    /// Fraction of the form reached, `1.0` once completed.
    pub fn progress(&self) -> f64 {
        match self.state {
            FormState::Filling(index) => (index + 1) as f64 / self.schema.len() as f64,
            FormState::Completed => 1.0,
        }
    }

    /// Progress as a whole percentage.
    pub fn progress_percent(&self) -> u16 {
        (self.progress() * 100.0).round() as u16
    }

    /// One status per section, for the indicator strip.
    pub fn section_statuses(&self) -> Vec<SectionStatus> {
        (0..self.schema.len())
            .map(|i| match self.state {
                FormState::Completed => SectionStatus::Done,
                FormState::Filling(current) if i < current => SectionStatus::Done,
                FormState::Filling(current) if i == current => SectionStatus::Current,
                FormState::Filling(_) => SectionStatus::Upcoming,
            })
            .collect()
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Index of the section being filled.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            FormState::Filling(index) => Some(index),
            FormState::Completed => None,
        }
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.controller.as_ref().map(SectionController::section)
    }

    pub fn controller(&self) -> Option<&SectionController> {
        self.controller.as_ref()
    }

    /// Answers merged from every section accepted so far.
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn is_last_section(&self) -> bool {
        self.current_index() == Some(self.schema.len() - 1)
    }

    pub fn can_retreat(&self) -> bool {
        matches!(self.state, FormState::Filling(index) if index > 0)
    }

    /// Check if the current section would be accepted.
    pub fn can_advance(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(SectionController::is_valid)
    }

    pub fn is_completed(&self) -> bool {
        self.state == FormState::Completed
    }

    /// Check if the sink accepted the payload.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// The payload built from the accumulated answers.
    pub fn submission(&self) -> Submission {
        Submission {
            form_id: self.schema.form_id.clone(),
            version: self.schema.version.clone(),
            answers: self.answers.clone(),
        }
    }

    fn enter(&mut self, index: usize) {
        self.state = FormState::Filling(index);
        self.controller = Some(SectionController::new(self.schema.sections[index].clone()));
    }

    fn deliver<S: SubmissionSink>(&mut self, sink: &mut S) -> Result<Advance, EngineError> {
        match sink.submit(&self.submission()) {
            Ok(()) => {
                self.acknowledged = true;
                tracing::info!(form_id = %self.schema.form_id, "submission acknowledged");
                Ok(Advance::Submitted)
            }
            Err(e) => {
                let error: anyhow::Error = e.into();
                tracing::warn!(form_id = %self.schema.form_id, error = %error, "submission failed");
                Err(EngineError::Submission(error))
            }
        }
    }
}
