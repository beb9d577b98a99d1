//! Authenticated request gateway.
//!
//! ARCHITECTURE
//! ============
//! Every outbound request is built through `Gateway::prepare`, which reads
//! the persisted credential and either attaches it as a bearer header or, if
//! it fails validation, purges it and sends the request anonymously.
//!
//! ERROR HANDLING
//! ==============
//! Failures propagate to the caller. A 401 answering a request that carried
//! a credential purges that credential before surfacing `Unauthorized`; a
//! 401 on an anonymous request (bad login) stays a plain `Status` error.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, error_message};
use crate::auth::token;
use crate::config::ClientConfig;
use crate::storage::{self, TokenStorage};

/// A request with credential injection already decided.
pub struct Prepared {
    pub builder: RequestBuilder,
    /// The credential attached to this request, if any.
    pub credential: Option<String>,
}

pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn TokenStorage>,
    request_timeout_secs: u64,
}

impl Gateway {
    /// Build a gateway over `storage` using the config's base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            storage,
            request_timeout_secs: config.timeouts.request_secs,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The persisted credential if it is fit to send; purges it otherwise.
    fn usable_credential(&self) -> Option<String> {
        let token = self.storage.load()?;
        if token::is_usable(&token) {
            return Some(token);
        }
        tracing::info!("persisted credential invalid or expired; sending request anonymously");
        storage::clear_logged(self.storage.as_ref());
        None
    }

    /// Build a request for `path`, attaching the bearer credential when valid.
    #[must_use]
    pub fn prepare(&self, method: Method, path: &str) -> Prepared {
        let credential = self.usable_credential();
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &credential {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Prepared { builder, credential }
    }

    /// Build a request that never carries a credential (login, register).
    #[must_use]
    pub fn prepare_anonymous(&self, method: Method, path: &str) -> Prepared {
        Prepared { builder: self.http.request(method, self.url(path)), credential: None }
    }

    /// Send a prepared request and map non-success statuses to errors.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the backend rejects an attached credential,
    /// `Status` for other non-success answers, and `Request`/`Timeout` when no
    /// response arrives.
    pub async fn send(&self, prepared: Prepared) -> Result<Response, ApiError> {
        let Prepared { builder, credential } = prepared;
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e, self.request_timeout_secs))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            if let Some(sent) = credential {
                self.purge_if_current(&sent);
                return Err(ApiError::Unauthorized { credential: sent });
            }
        }
        Err(ApiError::Status { status: status.as_u16(), message: error_message(&body) })
    }

    /// Remove the persisted credential unless it was replaced after `sent` went out.
    fn purge_if_current(&self, sent: &str) {
        if self.storage.load().as_deref() == Some(sent) {
            tracing::warn!("server rejected credential; clearing persisted token");
            storage::clear_logged(self.storage.as_ref());
        }
    }

    /// `GET path` and decode a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`]; additionally `Decode` for unexpected bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.prepare(Method::GET, path)).await?;
        self.decode(response).await
    }

    /// `POST path` with a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`]; additionally `Decode` for unexpected bodies.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(self.prepare(Method::POST, path), body).await
    }

    /// `POST path` anonymously with a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// See [`Gateway::post_json`].
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(self.prepare_anonymous(Method::POST, path), body).await
    }

    async fn send_json<B, T>(&self, mut prepared: Prepared, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        prepared.builder = prepared.builder.json(body);
        let response = self.send(prepared).await?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e, self.request_timeout_secs))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
