pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] validator::ValidationErrors),

    #[error("Quiz unavailable: {0}")]
    QuizUnavailable(String),

    #[error("Retakes are not allowed for this quiz")]
    RetakesDisallowed,

    #[error("Maximum number of attempts ({0}) reached")]
    MaxAttemptsExceeded(u32),

    #[error("Attempt is not active: status is '{0}'")]
    AttemptNotActive(String),

    #[error("Attempt time limit has elapsed")]
    AttemptExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    /// Whether the caller can recover by correcting the request.
    /// Store faults are the only variants signalling a system failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}
