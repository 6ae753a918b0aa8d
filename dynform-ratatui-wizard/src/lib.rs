//! # dynform-ratatui-wizard
//!
//! Terminal frontend for dynform. [`RatatuiBackend::login`] collects the
//! roll number and name; [`RatatuiBackend`] implements
//! [`dynform::FormBackend`] and walks the form one section at a time.
//!
//! Key handling is kept apart from drawing in [`WizardState`] and
//! [`LoginState`] so it can be driven without a terminal.

mod backend;
mod login;
mod state;

pub use backend::{RatatuiBackend, RatatuiError, Theme};
pub use login::{LoginAction, LoginField, LoginState};
pub use state::{Phase, WizardState};
