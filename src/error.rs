// Typed errors for calls against the contacts service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid user credentials")]
    BadAuthentication,

    #[error("request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid link {link}: {reason}")]
    InvalidLink { link: String, reason: String },
}

impl ApiError {
    /// True for failures the user can fix by logging in again.
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::BadAuthentication => true,
            ApiError::Status { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
