//! Bearer credential validation.
//!
//! DESIGN
//! ======
//! Checks are local only: shape (three dot-separated segments) and the `exp`
//! claim against the wall clock. Signature verification belongs to the
//! backend, which still answers 401 for forged or revoked tokens.
//!
//! ERROR HANDLING
//! ==============
//! The boolean checks never fail: any decode problem reads as "not valid".
//! `decode_claims` exposes the underlying error for diagnostics.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not three dot-separated segments")]
    Malformed,
    #[error("claims segment is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("claims segment is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims carried in the middle segment of a bearer token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry instant, seconds since the Unix epoch. NumericDate may be
    /// fractional.
    #[serde(default)]
    pub exp: Option<f64>,
    /// Every other claim, `iat` included, kept untyped so it cannot fail the decode.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Current wall-clock time in seconds since the Unix epoch.
#[must_use]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// True iff `token` is non-empty with exactly two `.` separators.
#[must_use]
pub fn is_structurally_valid(token: &str) -> bool {
    !token.is_empty() && token.matches('.').count() == 2
}

/// True iff the token's `exp` claim is present and strictly in the future.
#[must_use]
pub fn is_currently_valid(token: &str) -> bool {
    is_currently_valid_at(token, now_secs())
}

/// Expiry check against an explicit clock reading.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn is_currently_valid_at(token: &str, now: u64) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp.is_some_and(|exp| exp > now as f64),
        Err(e) => {
            tracing::debug!(error = %e, "credential claims could not be decoded");
            false
        }
    }
}

/// Both checks at once: the condition for sending a token.
#[must_use]
pub fn is_usable(token: &str) -> bool {
    is_usable_at(token, now_secs())
}

#[must_use]
pub fn is_usable_at(token: &str, now: u64) -> bool {
    is_structurally_valid(token) && is_currently_valid_at(token, now)
}

/// Decode the claims segment without verifying the signature.
///
/// # Errors
///
/// Returns an error if the token is not three segments or the middle segment
/// is not base64-encoded JSON.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed);
    };

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
