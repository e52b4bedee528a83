use thiserror::Error;

/// A required local input is missing. Detected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing text to translate")]
    MissingSourceText,

    #[error("Missing text to cleanup")]
    MissingTextToCleanup,

    #[error("Missing API key")]
    MissingApiKey,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-success status or a payload without the expected fields. The
    /// message is the one the remote service sent when it sent one.
    #[error("{message}")]
    RemoteApi { message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("form storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn remote(message: impl Into<String>) -> Self {
        AppError::RemoteApi {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
