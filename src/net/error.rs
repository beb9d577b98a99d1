//! Errors produced by backend calls.

/// Errors produced by gateway requests.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (connect, DNS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured bound.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The backend rejected `credential`. Storage no longer holds it.
    #[error("session rejected by server")]
    Unauthorized { credential: String },

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// The credential the backend rejected, if this is a rejection.
    #[must_use]
    pub fn rejected_credential(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { credential } => Some(credential),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { secs: timeout_secs }
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Human-readable message from an error response body.
///
/// Prefers the backend's `{"error": ".."}` or `{"message": ".."}` field and
/// falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() { "empty response".to_owned() } else { trimmed.to_owned() }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
