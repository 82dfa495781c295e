// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
    #[error("settings error: {0}")]
    Settings(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChatError {
    pub fn invalid_response(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// True when the server answered but the body did not have the expected shape.
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse { .. })
    }
}
