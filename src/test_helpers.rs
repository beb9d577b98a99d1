//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::auth::token::now_secs;
use crate::auth::{Company, Identity, Role};
use crate::net::ApiError;
use crate::net::auth_api::AuthApi;
use crate::net::types::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};

/// Build a JWT-shaped token whose claims segment carries `claims`.
pub fn token_with_claims(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Token expiring `secs` seconds from now.
pub fn fresh_token(secs: u64) -> String {
    token_with_claims(&serde_json::json!({ "sub": "u1", "exp": now_secs() + secs }))
}

/// Token that expired `secs` seconds ago.
pub fn expired_token(secs: u64) -> String {
    token_with_claims(&serde_json::json!({ "sub": "u1", "exp": now_secs().saturating_sub(secs) }))
}

pub fn identity(roles: &[Role]) -> Identity {
    Identity {
        id: "u1".into(),
        email: "jane@shiptornado.com".into(),
        first_name: Some("Jane".into()),
        last_name: Some("Smith".into()),
        roles: roles.to_vec(),
        company_id: Some("c1".into()),
    }
}

pub fn company() -> Company {
    Company { id: "c1".into(), name: "Ship Tornado".into() }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// MockAuthApi
// =============================================================================

/// Scripted `AuthApi`: each call pops the next queued result.
///
/// An empty queue answers with an `ApiError::Request`. `me_delay` makes
/// `me()` sleep before answering so tests can interleave other operations.
pub struct MockAuthApi {
    pub logins: Mutex<VecDeque<Result<AuthResponse, ApiError>>>,
    pub registers: Mutex<VecDeque<Result<AuthResponse, ApiError>>>,
    pub mes: Mutex<VecDeque<Result<MeResponse, ApiError>>>,
    pub me_delay: Option<Duration>,
    pub login_delay: Option<Duration>,
    pub me_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self {
            logins: Mutex::new(VecDeque::new()),
            registers: Mutex::new(VecDeque::new()),
            mes: Mutex::new(VecDeque::new()),
            me_delay: None,
            login_delay: None,
            me_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_me(self, result: Result<MeResponse, ApiError>) -> Self {
        self.mes.lock().unwrap().push_back(result);
        self
    }

    pub fn with_login(self, result: Result<AuthResponse, ApiError>) -> Self {
        self.logins.lock().unwrap().push_back(result);
        self
    }

    pub fn with_register(self, result: Result<AuthResponse, ApiError>) -> Self {
        self.registers.lock().unwrap().push_back(result);
        self
    }

    pub fn with_me_delay(mut self, delay: Duration) -> Self {
        self.me_delay = Some(delay);
        self
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = Some(delay);
        self
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }
}

fn exhausted() -> ApiError {
    ApiError::Request("mock exhausted".into())
}

#[async_trait::async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }
        self.logins.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.registers.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn me(&self) -> Result<MeResponse, ApiError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.me_delay {
            tokio::time::sleep(delay).await;
        }
        self.mes.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}
