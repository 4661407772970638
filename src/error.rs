//! Error types for the request client and screen controllers.
//!
//! [`ApiError`] is what the request client returns. Controllers never let it
//! escape: they fold it into a [`Failure`] value that the screen stores as
//! its settled state.

use serde::Serialize;
use thiserror::Error;

/// Errors produced by the request client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx status or a connection-level failure (DNS, refused, timeout).
    #[error("{}", transport_message(.status, .detail))]
    Transport {
        /// HTTP status when the server answered; `None` when it never did.
        status: Option<u16>,
        detail: String,
    },

    /// The body could not be decoded into the expected shape.
    #[error("Malformed response payload: {0}")]
    Payload(String),

    /// The endpoint could not be turned into a URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

fn transport_message(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("HTTP error! status: {} ({})", code, detail),
        None => format!("Request failed: {}", detail),
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::Payload(err.to_string());
        }
        ApiError::Transport {
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Payload(err.to_string())
    }
}

/// Which branch of the error taxonomy a screen failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Payload,
    NotFoundForDerivation,
}

/// Presentational failure stored in a settled screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    /// Map a client error to a screen failure carrying `message`.
    ///
    /// Transport and payload errors share the same user-facing text; only the
    /// kind differs.
    pub fn from_api(err: &ApiError, message: impl Into<String>) -> Self {
        let kind = match err {
            ApiError::Payload(_) => FailureKind::Payload,
            ApiError::Transport { .. } | ApiError::InvalidEndpoint(_) => FailureKind::Transport,
        };
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found_for_derivation(email: &str) -> Self {
        Self {
            kind: FailureKind::NotFoundForDerivation,
            message: format!(
                "No profile found for {}. Run a regular search for this address first.",
                email
            ),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}
