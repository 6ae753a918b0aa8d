use dynform::MissingCredentials;

/// Error type for session bootstrap.
///
/// `Display` is the text shown in the login banner.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Credentials(#[from] MissingCredentials),

    /// Registration refused by the server.
    #[error("{0}")]
    Register(String),

    /// Form fetch refused by the server.
    #[error("{0}")]
    FetchForm(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid form data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Login cancelled")]
    Cancelled,
}

impl BootstrapError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
