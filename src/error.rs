//! Error types
//!
//! Every failure surfaced to the host goes through [`Error`]. Callers that need
//! to apply an ignore policy classify errors with [`Error::kind`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for table callbacks, scope builders and API calls
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to obtain GCP credentials: {message}")]
    Credential { message: String },

    #[error("no active project could be resolved for this connection")]
    NoActiveProject,

    #[error("{service} API request failed: {status} {reason}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        /// Google status name from the error body, e.g. `PERMISSION_DENIED`
        reason: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid resource name {name:?}: no {segment:?} segment")]
    InvalidName { name: String, segment: String },

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("operation cancelled")]
    Cancelled,
}

/// Closed classification of [`Error`] used by ignore policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Credential,
    NoActiveProject,
    Transport,
    AccessDenied,
    NotFound,
    InvalidName,
    Config,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Credential => "CREDENTIAL",
            ErrorKind::NoActiveProject => "NO_ACTIVE_PROJECT",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::AccessDenied => "ACCESS_DENIED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidName => "INVALID_NAME",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

impl Error {
    pub fn credential(message: impl Into<String>) -> Self {
        Error::Credential {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn invalid_name(name: &str, segment: &str) -> Self {
        Error::InvalidName {
            name: name.to_string(),
            segment: segment.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Credential { .. } => ErrorKind::Credential,
            Error::NoActiveProject => ErrorKind::NoActiveProject,
            Error::Api { status, reason, .. } => match (*status, reason.as_str()) {
                (401, _) | (_, "UNAUTHENTICATED") => ErrorKind::Credential,
                (403, _) | (_, "PERMISSION_DENIED") => ErrorKind::AccessDenied,
                (404, _) | (_, "NOT_FOUND") => ErrorKind::NotFound,
                _ => ErrorKind::Transport,
            },
            Error::Transport(_) | Error::Decode(_) => ErrorKind::Transport,
            Error::InvalidName { .. } => ErrorKind::InvalidName,
            Error::Config { .. } => ErrorKind::Config,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether this error matches one of the configured `ignore_error_codes`.
    ///
    /// Codes are either HTTP statuses (`"403"`) or Google status names
    /// (`"PERMISSION_DENIED"`); only API errors carry either.
    pub fn matches_code(&self, codes: &[String]) -> bool {
        let Error::Api { status, reason, .. } = self else {
            return false;
        };
        let status = status.to_string();
        codes
            .iter()
            .any(|code| code == &status || code.eq_ignore_ascii_case(reason))
    }
}

/// Decide whether a callback error should be swallowed.
///
/// `kinds` is the table's declared ignorable set, `codes` the connection's
/// `ignore_error_codes`.
pub fn is_ignorable(err: &Error, kinds: &[ErrorKind], codes: &[String]) -> bool {
    kinds.contains(&err.kind()) || err.matches_code(codes)
}
