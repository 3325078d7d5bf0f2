//! Error types for the exposure-check pipeline.
//!
//! `IngestionError` is fatal to a batch. `LookupError` is per record and
//! always ends up as an `Unknown` report entry.

use breachcheck_core::FailureKind;
use thiserror::Error;

/// Errors that prevent a batch from starting.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The file name does not look like CSV
    #[error("please upload a valid CSV file (got {path})")]
    UnsupportedFile {
        /// Offending path
        path: String,
    },

    /// The bytes are not UTF-8 text
    #[error("input is not valid UTF-8 text: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// No rows at all
    #[error("CSV file is empty or formatted incorrectly (expected emails in the first column)")]
    Empty,

    /// The text does not parse as delimited rows
    #[error("error reading CSV file: {0}")]
    Malformed(#[from] csv::Error),

    /// Reading the input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a single exposure lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Connection refused, timeout, DNS failure
    #[error("network error: {detail}")]
    Network {
        /// Transport error text
        detail: String,
    },

    /// Non-success status code
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Body is not the expected JSON object
    #[error("malformed response: {detail}")]
    MalformedResponse {
        /// Decoder error text
        detail: String,
    },

    /// Client-side fault unrelated to the remote answer
    #[error("lookup client error: {detail}")]
    Client {
        /// Error text
        detail: String,
    },
}

impl LookupError {
    /// Report tag for this failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } => FailureKind::Network,
            Self::Http { .. } => FailureKind::Http,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::Client { .. } => FailureKind::Processing,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    /// The request URL carries the email in its query string, so it is
    /// stripped before the error text is kept.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_decode() {
            Self::MalformedResponse {
                detail: err.to_string(),
            }
        } else if err.is_builder() {
            Self::Client {
                detail: err.to_string(),
            }
        } else {
            Self::Network {
                detail: err.to_string(),
            }
        }
    }
}

/// Result type alias for ingestion.
pub type Result<T> = std::result::Result<T, IngestionError>;
