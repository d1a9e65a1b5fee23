use thiserror::Error;

/// Failure taxonomy shared by every remote call and synchronisation step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Remote resource is absent, or is the wrong kind (e.g. a directory where a file was expected).
    #[error("not found: {0}")]
    NotFound(String),

    /// The page service rejected a create or update because the slug is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A response envelope could not be decoded into the expected shape.
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// A required configuration field is missing or invalid.
    #[error("config: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, TLS, timeout, ...).
    #[error("network: {0}")]
    Network(String),

    /// The remote service answered with a status the caller did not expect.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("io: {0}")]
    Io(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Network(e.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e.to_string())
    }
}

impl SyncError {
    /// Maps a non-success HTTP status from either remote service onto the taxonomy.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => SyncError::NotFound(body),
            409 | 422 => SyncError::Conflict(body),
            _ => SyncError::UnexpectedStatus { status, body },
        }
    }
}
