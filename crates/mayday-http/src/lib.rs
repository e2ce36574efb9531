//! Mayday HTTP - collector transport
//!
//! Provides:
//! - A generic JSON / multipart request executor with status classification
//! - The default [`IReportHandler`](mayday_core::ports::IReportHandler)
//!   that uploads report batches to an HTTP collector
//!
//! ## Modules
//!
//! - [`transport`] - `HttpTransport` over `reqwest`
//! - [`multipart`] - `multipart/form-data` body builder
//! - [`handler`] - `ApiReportHandler`

pub mod handler;
pub mod multipart;
pub mod transport;

use mayday_core::ports::HandlerError;
use thiserror::Error;

pub use handler::ApiReportHandler;
pub use transport::{Attachments, HttpTransport, Outcome, TransportRequest};

/// Message used when an error response carries no body at all
pub const NO_JSON_MESSAGE: &str = "Expecting JSON as result";

/// Message used when a request failed without any underlying error text
pub const NO_ERROR_MESSAGE: &str = "No error";

/// A failed HTTP exchange
///
/// `code` is the HTTP status for error responses and 0 when no response
/// was received at all (connection refused, timeout, invalid request).
/// Displays as `description` alone, so collector messages surface verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct NetworkError {
    pub code: u16,
    pub description: String,
}

impl NetworkError {
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// An exchange that never produced a response
    pub fn unreachable(error: &reqwest::Error) -> Self {
        let description = error.to_string();
        if description.is_empty() {
            Self::new(0, NO_ERROR_MESSAGE)
        } else {
            Self::new(0, description)
        }
    }
}

impl From<NetworkError> for HandlerError {
    fn from(err: NetworkError) -> Self {
        HandlerError::Transport {
            code: err.code,
            description: err.description,
        }
    }
}
