use std::fmt;

use crate::{FormEngine, FormSchema, SchemaError};

/// Banner text shown on the login screen after a successful submission.
pub const SUBMITTED_BANNER: &str =
    "Form submitted successfully! You can log in again to submit another form.";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub roll_number: String,
    pub name: String,
}

/// What the login screen collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub roll_number: String,
    pub name: String,
}

/// Error type for credential checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please enter both roll number and name")]
pub struct MissingCredentials;

impl Credentials {
    pub fn new(roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            name: name.into(),
        }
    }

    /// Reject empty roll numbers or names.
    pub fn check(&self) -> Result<(), MissingCredentials> {
        if self.roll_number.is_empty() || self.name.is_empty() {
            return Err(MissingCredentials);
        }
        Ok(())
    }

    /// The user these credentials identify.
    pub fn user(&self) -> User {
        User {
            roll_number: self.roll_number.clone(),
            name: self.name.clone(),
        }
    }
}

/// Message shown above the login inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Submitted,
}

impl Banner {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(message) => f.write_str(message),
            Self::Submitted => f.write_str(SUBMITTED_BANNER),
        }
    }
}

/// Error type for session transitions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Already filling a form")]
    AlreadyFilling,

    #[error("No form is being filled")]
    NotFilling,

    #[error("Form has not been submitted yet")]
    NotSubmitted,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Where a user is in the login, fill, done cycle.
#[derive(Debug)]
pub enum Session {
    LoggedOut { banner: Option<Banner> },
    Filling { user: User, engine: FormEngine },
    Done { user: User },
}

impl Default for Session {
    fn default() -> Self {
        Self::LoggedOut { banner: None }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a login or bootstrap failure.
    pub fn login_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if matches!(self, Self::Filling { .. }) {
            return Err(SessionError::AlreadyFilling);
        }
        *self = Self::LoggedOut {
            banner: Some(Banner::Error(message.into())),
        };
        Ok(())
    }

    /// Start filling a freshly fetched form.
    pub fn logged_in(&mut self, user: User, schema: FormSchema) -> Result<(), SessionError> {
        if matches!(self, Self::Filling { .. }) {
            return Err(SessionError::AlreadyFilling);
        }
        let engine = FormEngine::new(schema)?;
        tracing::info!(roll_number = %user.roll_number, "user logged in");
        *self = Self::Filling { user, engine };
        Ok(())
    }

    /// Close a form whose payload was accepted.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        let Self::Filling { user, engine } = self else {
            return Err(SessionError::NotFilling);
        };
        if !engine.is_completed() || !engine.is_acknowledged() {
            return Err(SessionError::NotSubmitted);
        }
        let user = user.clone();
        *self = Self::Done { user };
        Ok(())
    }

    /// Drop everything and return to a clean login screen.
    pub fn log_out(&mut self) {
        *self = Self::default();
    }

    /// The banner to show on the login screen.
    pub fn banner(&self) -> Option<Banner> {
        match self {
            Self::LoggedOut { banner } => banner.clone(),
            Self::Done { .. } => Some(Banner::Submitted),
            Self::Filling { .. } => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut FormEngine> {
        match self {
            Self::Filling { engine, .. } => Some(engine),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Filling { user, .. } | Self::Done { user } => Some(user),
            Self::LoggedOut { .. } => None,
        }
    }

    pub fn is_filling(&self) -> bool {
        matches!(self, Self::Filling { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSpec, MemorySink, Section};

    fn schema() -> FormSchema {
        FormSchema::new(
            "T",
            "f",
            "1",
            vec![Section::new(
                1,
                "Only",
                vec![FieldSpec::new("name", "text", "Name").required()],
            )],
        )
    }

    fn user() -> User {
        Credentials::new("21CS001", "Ada").user()
    }

    #[test]
    fn credentials_require_both_values() {
        assert!(Credentials::new("21CS001", "Ada").check().is_ok());
        for creds in [Credentials::new("", "Ada"), Credentials::new("21CS001", "")] {
            assert_eq!(
                creds.check().unwrap_err().to_string(),
                "Please enter both roll number and name"
            );
        }
    }

    #[test]
    fn login_failure_sets_banner() {
        let mut session = Session::new();
        assert_eq!(session.banner(), None);

        session.login_failed("Couldn't get form").unwrap();
        assert_eq!(
            session.banner(),
            Some(Banner::Error("Couldn't get form".into()))
        );
        assert!(session.user().is_none());
    }

    #[test]
    fn full_cycle() {
        let mut session = Session::new();
        session.logged_in(user(), schema()).unwrap();
        assert!(session.is_filling());
        assert!(matches!(
            session.logged_in(user(), schema()),
            Err(SessionError::AlreadyFilling)
        ));

        let engine = session.engine_mut().unwrap();
        engine.set_value("name", "Ada").unwrap();
        engine.advance(&mut MemorySink::new()).unwrap();

        session.finish().unwrap();
        assert_eq!(session.banner(), Some(Banner::Submitted));
        assert_eq!(session.banner().unwrap().to_string(), SUBMITTED_BANNER);
        assert_eq!(session.user().unwrap().name, "Ada");

        session.logged_in(user(), schema()).unwrap();
        assert!(session.is_filling());
    }

    #[test]
    fn finish_requires_acknowledged_submission() {
        let mut session = Session::new();
        assert!(matches!(session.finish(), Err(SessionError::NotFilling)));

        session.logged_in(user(), schema()).unwrap();
        assert!(matches!(session.finish(), Err(SessionError::NotSubmitted)));

        let engine = session.engine_mut().unwrap();
        engine.set_value("name", "Ada").unwrap();
        assert!(engine.advance(&mut MemorySink::failing(1)).is_err());
        assert!(matches!(session.finish(), Err(SessionError::NotSubmitted)));
        assert!(session.is_filling());
    }

    #[test]
    fn invalid_schema_keeps_session_logged_out() {
        let mut session = Session::new();
        let empty = FormSchema::new("T", "f", "1", vec![]);
        assert!(matches!(
            session.logged_in(user(), empty),
            Err(SessionError::Schema(SchemaError::NoSections))
        ));
        assert!(matches!(session, Session::LoggedOut { banner: None }));
    }

    #[test]
    fn log_out_clears_everything() {
        let mut session = Session::new();
        session.logged_in(user(), schema()).unwrap();
        session.log_out();
        assert!(session.user().is_none());
        assert_eq!(session.banner(), None);
    }
}
