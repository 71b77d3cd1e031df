//! Response envelope shared by every API endpoint.
//!
//! The server wraps all payloads in `{status, data, errorCode, errorMessage,
//! fieldErrors}`. A non-success status can arrive with HTTP 200, so callers
//! must go through [`Envelope::into_result`] rather than reading `data`
//! directly.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Business status of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

/// Per-field validation failure reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub constraint: String,
    pub message: String,
}

/// Uniform response wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub field_errors: Option<Vec<FieldError>>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, trusting `data` only on a success status.
    pub fn into_result(self) -> Result<T, Error> {
        match self.status {
            Status::Success => self.data.ok_or_else(|| Error::Api {
                status: Status::Success,
                code: None,
                message: "success envelope with no data".to_string(),
                field_errors: Vec::new(),
            }),
            status => Err(self.business_error(status)),
        }
    }

    /// Check the status of an envelope whose payload is void.
    pub fn ok(self) -> Result<(), Error> {
        match self.status {
            Status::Success => Ok(()),
            status => Err(self.business_error(status)),
        }
    }

    fn business_error(self, status: Status) -> Error {
        Error::Api {
            status,
            code: self.error_code,
            message: self
                .error_message
                .unwrap_or_else(|| "request failed".to_string()),
            field_errors: self.field_errors.unwrap_or_default(),
        }
    }
}
