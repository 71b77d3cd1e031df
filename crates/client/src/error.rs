//! Client error types.

use thiserror::Error;

use crate::envelope::{FieldError, Status};

/// Errors surfaced by the gateway and the typed clients built on it.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or protocol failure below the envelope layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success envelope.
    #[error("api error: {message}")]
    Api {
        status: Status,
        code: Option<String>,
        message: String,
        field_errors: Vec<FieldError>,
    },

    /// 401 that could not be recovered: the target was an auth endpoint,
    /// or the post-refresh resend was rejected again.
    #[error("unauthorized")]
    Unauthorized,

    /// The refresh protocol failed. Credentials have been cleared and a
    /// `SessionEvent::Expired` was emitted before this error is returned.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Input rejected locally, before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Response body could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential persistence error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
