//! Errors surfaced by the gateway to its callers.

use serde_json::Value;
use thiserror::Error;

/// Every failure a caller can observe from an API call.
///
/// Decoded once at the transport boundary, so call sites match on variants
/// instead of digging through response bodies. `Clone` because a single
/// refresh failure is handed to every request queued behind it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{}", status_display(.status, .message))]
    Status {
        status: u16,
        /// The `message` field of a JSON error body, when the server sent one.
        message: Option<String>,
        /// Raw response body.
        raw: String,
    },

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("network error: {message}")]
    Network { message: String },

    /// The refresh endpoint answered with a success status but no token.
    #[error("no token received")]
    NoTokenReceived,

    /// The task leading a refresh was dropped before the refresh settled.
    #[error("credential refresh was abandoned")]
    RefreshAbandoned,

    /// A caller error caught before any network I/O.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("could not decode response: {message}")]
    Decode { message: String },
}

fn status_display(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("request failed with status {}: {}", status, message),
        None => format!("request failed with status {}", status),
    }
}

impl ApiError {
    /// Build a status error from a response body, extracting `message` when
    /// the body is a JSON object that carries one.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned));
        ApiError::Status {
            status,
            message,
            raw,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Whether a failed refresh proves the session is gone (401, 403 or 404).
    pub fn is_session_invalid(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403) | Some(404))
    }

    /// Failures worth retrying later: timeouts, network errors and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout { .. } | ApiError::Network { .. } => true,
            ApiError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a reqwest failure onto the taxonomy.
    pub fn from_reqwest(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            return ApiError::Timeout { timeout_ms };
        }
        if error.is_decode() {
            return ApiError::Decode {
                message: error.to_string(),
            };
        }
        ApiError::Network {
            message: error.to_string(),
        }
    }
}
