//! Scamscope client SDK
//!
//! Typed client for the Scamscope fraud-analysis service.
//!
//! This crate provides:
//! - Credential storage for the access/refresh token pair
//! - An HTTP gateway that attaches bearer auth and transparently refreshes
//!   expired access tokens, retrying the failed request exactly once
//! - A session manager covering login, registration, logout, and the
//!   silent profile fetch on startup
//! - Typed operations for the analysis endpoints (models, analyze,
//!   history, detail, reference-document submission)

pub mod analysis;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod session;

#[cfg(test)]
pub(crate) mod testserver;

pub use analysis::AnalysisClient;
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use envelope::{Envelope, FieldError, Status};
pub use error::Error;
pub use gateway::{Gateway, SessionEvent};
pub use session::{SessionManager, SessionState};
