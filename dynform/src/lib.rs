//! # dynform
//!
//! Schema-driven multi-section forms. Frontend-agnostic.
//!
//! A form is fetched as a [`FormSchema`]: ordered sections, each a list of
//! declarative field specs. The [`FormEngine`] walks the sections, validating
//! each one as a unit before moving on, and hands the accumulated answers to a
//! [`SubmissionSink`] after the last section.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dynform::{FormBackend, FormEngine, LogSink};
//!
//! let mut engine = FormEngine::new(schema)?;
//! let mut sink = LogSink::new();
//!
//! match backend.run(&mut engine, &mut sink)? {
//!     RunOutcome::Submitted => println!("{}", engine.submission().to_json()),
//!     RunOutcome::Cancelled => {}
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`validate`] - per-field rules derived from a field definition
//! - [`render`] - field type to control mapping and input binding
//! - [`SectionController`] - value store and validity of one section
//! - [`FormEngine`] - navigation, accumulation, submission
//! - [`Session`] - login, fill, done cycle of one terminal
//!
//! ## Frontends
//!
//! Frontends are separate crates that implement `FormBackend`:
//! - `dynform-ratatui-wizard` - TUI wizard

pub use dynform_types::*;

mod backend;
mod engine;
pub mod render;
mod section;
mod session;
mod sink;

pub use backend::{FormBackend, RunOutcome};
pub use engine::{Advance, EngineError, FormEngine, FormState, SectionStatus};
pub use render::{
    Control, FieldIcon, FieldInput, RenderError, RenderedField, TextKind, render_field,
    render_section,
};
pub use section::{DATE_FORMAT, SectionController, SectionError, SectionRejected, is_iso_date};
pub use session::{
    Banner, Credentials, MissingCredentials, SUBMITTED_BANNER, Session, SessionError, User,
};
pub use sink::{LogSink, MemorySink, Refused, Submission, SubmissionSink};

// Scripted backend for driving forms without user interaction
mod test_backend;
pub use test_backend::{ScriptedBackend, ScriptedError};
