//! Error type for the ksef-pdf-client library.
//!
//! Every fallible call returns [`KsefPdfError`]. The variants map one-to-one
//! onto the stages of a call:
//!
//! * [`KsefPdfError::InvalidArgument`]: rejected before any network I/O.
//! * [`KsefPdfError::Transport`]: the HTTP exchange itself failed
//!   (connection refused, DNS, timeout, truncated success body).
//! * [`KsefPdfError::RequestFailed`]: the service answered with a non-2xx
//!   status.
//! * [`KsefPdfError::Cancelled`]: the caller's cancellation token fired
//!   while the request was in flight.

use reqwest::StatusCode;
use thiserror::Error;

/// Fixed prefix of every [`KsefPdfError::RequestFailed`] message.
pub const REQUEST_FAILED_PREFIX: &str = "Error generating PDF.";

/// All errors returned by the ksef-pdf-client library.
#[derive(Debug, Error)]
pub enum KsefPdfError {
    /// A required input was empty, whitespace-only or otherwise unusable.
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },

    /// The service responded with a non-success HTTP status.
    ///
    /// `server_response` holds the response body when it could be read and
    /// was non-empty.
    #[error("HTTP Error {status}: {}", failure_message(.server_response))]
    RequestFailed {
        status: StatusCode,
        server_response: Option<String>,
    },

    /// The underlying HTTP transport failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request was aborted through its cancellation token.
    #[error("Request cancelled")]
    Cancelled,
}

impl KsefPdfError {
    pub(crate) fn blank(field: &'static str) -> Self {
        Self::InvalidArgument {
            field,
            reason: "value must not be empty or whitespace",
        }
    }

    /// HTTP status of a [`KsefPdfError::RequestFailed`], or of a transport
    /// error that carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Diagnostic text the service sent alongside a failure status.
    pub fn server_response(&self) -> Option<&str> {
        match self {
            Self::RequestFailed {
                server_response, ..
            } => server_response.as_deref(),
            _ => None,
        }
    }
}

fn failure_message(server_response: &Option<String>) -> String {
    match server_response {
        Some(text) => format!("{REQUEST_FAILED_PREFIX} Server response: {text}"),
        None => REQUEST_FAILED_PREFIX.to_string(),
    }
}
