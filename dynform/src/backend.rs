use crate::{FormEngine, SubmissionSink};

/// How a frontend run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The form was completed and the sink accepted the payload.
    Submitted,

    /// The user walked away before the payload was accepted.
    Cancelled,
}

/// A frontend that lets a user fill a form.
///
/// Implementations draw the current section of the engine, feed user input
/// back into it, and call [`FormEngine::advance`] with the given sink when
/// the user asks for the next section.
pub trait FormBackend {
    /// The error type returned by this frontend.
    type Error: Into<anyhow::Error>;

    /// Drive the engine until the form is submitted or the user cancels.
    fn run<S: SubmissionSink>(
        &self,
        engine: &mut FormEngine,
        sink: &mut S,
    ) -> Result<RunOutcome, Self::Error>;
}
