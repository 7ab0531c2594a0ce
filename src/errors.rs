use reqwest::StatusCode;

/// Failure of a single backend request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response body: expected {expected}")]
    UnexpectedBody { expected: &'static str },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// How a failure should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught before any request; shown next to the offending field.
    Validation,
    /// A normal branch, never an alert.
    NotFound,
    /// Dismissible alert plus a transient announcement.
    Transport,
    /// Blocking alert asking the user to sign in again.
    Authentication,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("payment failed: {0}")]
    Payment(String),

    #[error("session storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("AI provider error: {0}")]
    Ai(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Unauthorized(_) => ErrorKind::Authentication,
            AppError::Api(e) if e.is_not_found() => ErrorKind::NotFound,
            AppError::Api(e) if e.is_auth() => ErrorKind::Authentication,
            AppError::Api(_)
            | AppError::Payment(_)
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Ai(_) => ErrorKind::Transport,
        }
    }
}
