use serde::{Deserialize, Serialize};

use crate::Answers;

/// The final payload of a completed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: String,
    pub version: String,
    pub answers: Answers,
}

impl Submission {
    /// Render the payload as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "formId": self.form_id,
            "version": self.version,
            "answers": self.answers.to_json(),
        })
    }
}

/// Destination for completed forms.
pub trait SubmissionSink {
    /// The error type returned when a submission is not accepted.
    type Error: Into<anyhow::Error>;

    /// Hand over a completed form.
    fn submit(&mut self, submission: &Submission) -> Result<(), Self::Error>;
}

impl<S: SubmissionSink + ?Sized> SubmissionSink for &mut S {
    type Error = S::Error;

    fn submit(&mut self, submission: &Submission) -> Result<(), Self::Error> {
        (**self).submit(submission)
    }
}

/// Logs the payload and keeps it for printing once the terminal is free.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<Submission>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent payload.
    pub fn last(&self) -> Option<&Submission> {
        self.last.as_ref()
    }

    /// Take the most recent payload, leaving none.
    pub fn take(&mut self) -> Option<Submission> {
        self.last.take()
    }
}

impl SubmissionSink for LogSink {
    type Error = serde_json::Error;

    fn submit(&mut self, submission: &Submission) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(submission)?;
        tracing::info!(form_id = %submission.form_id, %payload, "FORM SUBMITTED");
        self.last = Some(submission.clone());
        Ok(())
    }
}

/// Error returned by a [`MemorySink`] primed to fail.
#[derive(Debug, thiserror::Error)]
#[error("Submission refused ({remaining} more failure(s) queued)")]
pub struct Refused {
    pub remaining: usize,
}

/// Records submissions in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Vec<Submission>,
    failures: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` submissions.
    pub fn failing(count: usize) -> Self {
        Self {
            submissions: Vec::new(),
            failures: count,
        }
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn last(&self) -> Option<&Submission> {
        self.submissions.last()
    }
}

impl SubmissionSink for MemorySink {
    type Error = Refused;

    fn submit(&mut self, submission: &Submission) -> Result<(), Self::Error> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(Refused {
                remaining: self.failures,
            });
        }
        self.submissions.push(submission.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        let mut answers = Answers::new();
        answers.insert("fullName", "Ada");
        Submission {
            form_id: "f1".into(),
            version: "1".into(),
            answers,
        }
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(submission()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "formId": "f1",
                "version": "1",
                "answers": { "fullName": "Ada" },
            })
        );
        assert_eq!(submission().to_json(), json);
    }

    #[test]
    fn log_sink_keeps_last_payload() {
        let mut sink = LogSink::new();
        sink.submit(&submission()).unwrap();
        assert_eq!(sink.last(), Some(&submission()));
        assert_eq!(sink.take(), Some(submission()));
        assert!(sink.last().is_none());
    }

    #[test]
    fn memory_sink_fails_then_accepts() {
        let mut sink = MemorySink::failing(2);
        assert_eq!(sink.submit(&submission()).unwrap_err().remaining, 1);
        assert_eq!(sink.submit(&submission()).unwrap_err().remaining, 0);
        sink.submit(&submission()).unwrap();
        assert_eq!(sink.submissions().len(), 1);
    }
}
