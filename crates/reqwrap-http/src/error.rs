//! Request error taxonomy.
//!
//! Every failure the executor itself detects is *classified* into one of
//! [`ErrorKind`]. Classified errors are the only ones eligible for retry.
//! Everything else (payload encoding, malformed success bodies, bad
//! configuration) is reported as-is and is never retried.

use reqwrap_common_config::{ConfigError, EnvError};
use serde_json::Value;
use std::fmt;

/// Classification of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport never produced a response.
    Network,
    /// The server answered with a status outside `[200, 300)`.
    Status,
    /// A 2xx response whose envelope `type` is not the success code.
    Business,
    /// Auto retry gave up after reaching its attempt limit.
    RetryLimitExceeded,
}

impl ErrorKind {
    /// Stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "NetworkError",
            Self::Status => "StatusError",
            Self::Business => "BusinessError",
            Self::RetryLimitExceeded => "RetryLimitExceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the executor.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("{status}: {status_text}")]
    Status { status: u16, status_text: String },

    #[error("business error (type {code}): {message}")]
    Business {
        code: i64,
        message: String,
        /// The parsed response body exactly as received.
        envelope: Value,
    },

    #[error("retry limit exceeded after {attempts} attempts: {last}")]
    RetryLimitExceeded {
        attempts: u32,
        #[source]
        last: Box<RequestError>,
    },

    #[error("invalid request url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("failed to parse response JSON (status {status}): {source}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("environment error: {0}")]
    Env(#[from] EnvError),
}

impl RequestError {
    pub(crate) fn network(source: reqwest::Error) -> Self {
        Self::Network { source }
    }

    pub(crate) fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    pub(crate) fn business(envelope: Value) -> Self {
        let code = crate::envelope::type_code(&envelope).unwrap_or_default();
        let message = envelope
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self::Business {
            code,
            message,
            envelope,
        }
    }

    /// Classification, `None` for errors the executor does not classify.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Network { .. } => Some(ErrorKind::Network),
            Self::Status { .. } => Some(ErrorKind::Status),
            Self::Business { .. } => Some(ErrorKind::Business),
            Self::RetryLimitExceeded { .. } => Some(ErrorKind::RetryLimitExceeded),
            _ => None,
        }
    }

    /// Whether this error went through classification.
    pub fn is_classified(&self) -> bool {
        self.kind().is_some()
    }

    /// Human-readable message.
    ///
    /// Status errors read `"<status>: <reason>"`, business errors carry the
    /// envelope's `msg`.
    pub fn message(&self) -> String {
        match self {
            Self::Network { source } => source.to_string(),
            Self::Business { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status for status errors, envelope `type` for business errors,
    /// `0` otherwise.
    pub fn http_status_or_business_code(&self) -> i64 {
        match self {
            Self::Status { status, .. } => i64::from(*status),
            Self::Business { code, .. } => *code,
            Self::RetryLimitExceeded { last, .. } => last.http_status_or_business_code(),
            _ => 0,
        }
    }

    /// Raw envelope of a business error.
    pub fn envelope(&self) -> Option<&Value> {
        match self {
            Self::Business { envelope, .. } => Some(envelope),
            Self::RetryLimitExceeded { last, .. } => last.envelope(),
            _ => None,
        }
    }

    /// The error that ended the last attempt, unwrapping retry exhaustion.
    pub fn last_attempt(&self) -> &RequestError {
        match self {
            Self::RetryLimitExceeded { last, .. } => last.last_attempt(),
            other => other,
        }
    }
}
