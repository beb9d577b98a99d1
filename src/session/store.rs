//! Session store: credential, identity, and verification lifecycle.
//!
//! ARCHITECTURE
//! ============
//! The current `Session` lives in a `tokio::sync::watch` channel: readers take
//! cheap snapshots or subscribe for changes, and every transition happens
//! inside a single `send_if_modified` closure so the check and the write are
//! one step.
//!
//! Phases run `Uninitialized -> Verifying -> {Authenticated, Unauthenticated}`.
//! `bootstrap` reads the persisted credential and, when it passes local
//! validation, confirms it with the backend's identity endpoint under a fixed
//! timeout.
//!
//! STALENESS
//! =========
//! `Session::generation` increases whenever the session is replaced: a
//! verification starting, a login or register applying, logout, or a purge.
//! Every async continuation captures the generation before it awaits and only
//! applies its result if the generation is unchanged. A verification that
//! finishes after a logout or a newer login is dropped.
//!
//! ERROR HANDLING
//! ==============
//! Credential problems (malformed, expired, rejected, verification failure or
//! timeout) are absorbed here: storage is cleared, the session drops to
//! `Unauthenticated`, and a `tracing` event records why. Login and register
//! failures propagate to the caller with the prior session untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::auth::{Company, Identity, token};
use crate::net::ApiError;
use crate::net::auth_api::AuthApi;
use crate::net::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::storage::{self, StorageError, TokenStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing has been read from storage yet.
    Uninitialized,
    /// A persisted credential is being confirmed with the backend.
    Verifying,
    Authenticated,
    Unauthenticated,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: Option<String>,
    pub identity: Option<Identity>,
    pub company: Option<Company>,
    pub phase: SessionPhase,
    pub generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self { credential: None, identity: None, company: None, phase: SessionPhase::Uninitialized, generation: 0 }
    }
}

impl Session {
    /// True until the first verification has resolved.
    #[must_use]
    pub fn loading(&self) -> bool {
        matches!(self.phase, SessionPhase::Uninitialized | SessionPhase::Verifying)
    }

    /// Credential held, well formed, unexpired, and identity loaded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(token::now_secs())
    }

    #[must_use]
    pub fn is_authenticated_at(&self, now_secs: u64) -> bool {
        self.identity.is_some()
            && self.credential.as_deref().is_some_and(|t| {
                token::is_structurally_valid(t) && token::is_currently_valid_at(t, now_secs)
            })
    }

    fn clear(&mut self) {
        self.credential = None;
        self.identity = None;
        self.company = None;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The backend answered with a token that fails local validation.
    #[error("server issued an invalid or expired token")]
    InvalidToken,

    /// The session changed (logout or another login) while the request ran.
    #[error("session changed while the request was in flight")]
    Superseded,
}

/// What `bootstrap` decided while holding the state lock.
enum Bootstrap {
    Settled,
    Verify { token: String, generation: u64 },
}

// =============================================================================
// SESSION STORE
// =============================================================================

pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn TokenStorage>,
    api: Arc<dyn AuthApi>,
    verify_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>, api: Arc<dyn AuthApi>, verify_timeout: Duration) -> Self {
        Self { state: watch::Sender::new(Session::default()), storage, api, verify_timeout }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receive every session change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Drop credential and identity, clear storage, start a new generation.
    fn reset(&self, s: &mut Session) {
        s.generation += 1;
        storage::clear_logged(self.storage.as_ref());
        s.clear();
        s.phase = SessionPhase::Unauthenticated;
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Resolve the session from the persisted credential.
    ///
    /// Does nothing when the session already reflects what storage holds, so
    /// repeated calls neither refetch nor start a second verification.
    pub async fn bootstrap(&self) {
        let persisted = self.storage.load();
        let mut decision = Bootstrap::Settled;

        self.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Uninitialized && s.credential == persisted {
                return false;
            }
            match persisted {
                None => {
                    tracing::debug!("no persisted credential");
                    s.generation += 1;
                    s.clear();
                    s.phase = SessionPhase::Unauthenticated;
                }
                Some(t) if !token::is_usable(&t) => {
                    tracing::info!("persisted credential malformed or expired; discarding");
                    self.reset(s);
                }
                Some(t) => {
                    s.generation += 1;
                    s.clear();
                    s.credential = Some(t.clone());
                    s.phase = SessionPhase::Verifying;
                    decision = Bootstrap::Verify { token: t, generation: s.generation };
                }
            }
            true
        });

        if let Bootstrap::Verify { token, generation } = decision {
            self.verify(token, generation).await;
        }
    }

    async fn verify(&self, sent: String, generation: u64) {
        tracing::info!(generation, "verifying persisted credential");
        let outcome = match tokio::time::timeout(self.verify_timeout, self.api.me()).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout { secs: self.verify_timeout.as_secs() }),
        };

        self.state.send_if_modified(|s| {
            if s.generation != generation {
                tracing::debug!(started = generation, current = s.generation, "discarding stale verification");
                return false;
            }
            match outcome {
                Ok(me) => {
                    tracing::info!(user = %me.user.email, "session verified");
                    s.identity = Some(me.user);
                    s.company = me.company;
                    s.phase = SessionPhase::Authenticated;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "credential verification failed; signing out");
                    if self.storage.load().as_deref() == Some(sent.as_str()) {
                        storage::clear_logged(self.storage.as_ref());
                    }
                    s.clear();
                    s.phase = SessionPhase::Unauthenticated;
                }
            }
            true
        });
    }

    // =========================================================================
    // LOGIN / REGISTER / LOGOUT
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the login is refused, `Storage` if the
    /// credential cannot be persisted, and `Superseded` if the session changed
    /// while the request was in flight. The prior session is kept in all cases.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, SessionError> {
        let generation = self.generation();
        let response = self.api.login(request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "login failed");
        })?;
        self.apply_auth(generation, response)
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionStore::login`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, SessionError> {
        let generation = self.generation();
        let response = self.api.register(request).await.inspect_err(|e| {
            tracing::warn!(error = %e, "registration failed");
        })?;
        self.apply_auth(generation, response)
    }

    fn apply_auth(&self, generation: u64, response: AuthResponse) -> Result<Session, SessionError> {
        let AuthResponse { token: issued, user, company } = response;
        if !token::is_usable(&issued) {
            tracing::warn!("server issued a token that fails local validation");
            return Err(SessionError::InvalidToken);
        }

        let mut outcome = Err(SessionError::Superseded);
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                tracing::debug!(started = generation, current = s.generation, "discarding stale sign-in");
                return false;
            }
            if let Err(e) = self.storage.save(&issued) {
                tracing::warn!(error = %e, "failed to persist credential");
                outcome = Err(e.into());
                return false;
            }
            tracing::info!(user = %user.email, "signed in");
            s.generation += 1;
            s.credential = Some(issued);
            s.identity = Some(user);
            s.company = company;
            s.phase = SessionPhase::Authenticated;
            outcome = Ok(s.clone());
            true
        });
        outcome
    }

    /// Sign out immediately. Pending verifications and sign-ins are dropped.
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            tracing::info!("signed out");
            self.reset(s);
        });
    }

    // =========================================================================
    // REVALIDATION
    // =========================================================================

    /// Re-check the held credential against the clock; purge it if expired.
    ///
    /// Returns true if the session was cleared.
    pub fn revalidate(&self) -> bool {
        let now = token::now_secs();
        let mut purged = false;
        self.state.send_if_modified(|s| {
            let Some(held) = s.credential.as_deref() else {
                return false;
            };
            if token::is_structurally_valid(held) && token::is_currently_valid_at(held, now) {
                return false;
            }
            tracing::info!("held credential expired; signing out");
            self.reset(s);
            purged = true;
            true
        });
        purged
    }

    /// React to a data-call failure. A rejection of the credential the
    /// session still holds ends it; a rejection of an older credential and
    /// any other error leave it alone.
    ///
    /// Returns true if the session was cleared.
    pub fn handle_api_error(&self, err: &ApiError) -> bool {
        let Some(rejected) = err.rejected_credential() else {
            return false;
        };
        self.state.send_if_modified(|s| {
            if s.credential.as_deref() != Some(rejected) {
                tracing::debug!("ignoring rejection of a credential the session no longer holds");
                return false;
            }
            tracing::warn!("server rejected credential; signing out");
            self.reset(s);
            true
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
