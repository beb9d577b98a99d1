//! Auth endpoints behind a mockable async trait.
//!
//! DESIGN
//! ======
//! The session store talks to the backend only through `AuthApi`, so tests
//! can script login and identity answers without a server. `Gateway` is the
//! production implementation. Login and register go out without a bearer
//! header, so a wrong password surfaces as the backend's message instead of
//! purging a credential that is still good.

use super::error::ApiError;
use super::gateway::Gateway;
use super::types::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const ME_PATH: &str = "/api/auth/me";

// =============================================================================
// AUTH API TRAIT
// =============================================================================

/// Backend operations the session store depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange email and password for a credential and identity.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the backend rejects the credentials or
    /// cannot be reached.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if registration is refused or the backend
    /// cannot be reached.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    /// Resolve the identity behind the persisted credential.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for any failure, including a rejected credential.
    async fn me(&self) -> Result<MeResponse, ApiError>;
}

#[async_trait::async_trait]
impl AuthApi for Gateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        tracing::debug!(email = %request.email, "login request");
        self.post_json_anonymous(LOGIN_PATH, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        tracing::debug!(email = %request.email, "register request");
        self.post_json_anonymous(REGISTER_PATH, request).await
    }

    async fn me(&self) -> Result<MeResponse, ApiError> {
        self.get_json(ME_PATH).await
    }
}
