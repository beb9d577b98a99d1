use super::*;
use crate::storage::MemoryTokenStorage;
use crate::test_helpers::{expired_token, fresh_token, serve};

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;

fn gateway_with(storage: &MemoryTokenStorage, base_url: &str) -> Gateway {
    let config = ClientConfig::new(base_url, "/unused").unwrap();
    Gateway::new(&config, Arc::new(storage.clone())).unwrap()
}

fn auth_header(prepared: Prepared) -> Option<String> {
    let request = prepared.builder.build().unwrap();
    request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap().to_owned())
}

// =============================================================================
// prepare: credential injection
// =============================================================================

#[test]
fn valid_credential_is_attached_as_bearer() {
    let token = fresh_token(600);
    let storage = MemoryTokenStorage::with_token(&token);
    let gw = gateway_with(&storage, "http://localhost:5001");

    let prepared = gw.prepare(Method::GET, "/api/orders");
    assert_eq!(prepared.credential.as_deref(), Some(token.as_str()));
    assert_eq!(auth_header(prepared), Some(format!("Bearer {token}")));
    assert_eq!(storage.load(), Some(token));
}

#[test]
fn expired_credential_is_purged_and_omitted() {
    let storage = MemoryTokenStorage::with_token(&expired_token(60));
    let gw = gateway_with(&storage, "http://localhost:5001");

    let prepared = gw.prepare(Method::GET, "/api/orders");
    assert!(prepared.credential.is_none());
    assert!(auth_header(prepared).is_none());
    assert!(storage.load().is_none());
}

#[test]
fn malformed_credential_is_purged_and_omitted() {
    let storage = MemoryTokenStorage::with_token("not-a-jwt");
    let gw = gateway_with(&storage, "http://localhost:5001");

    assert!(auth_header(gw.prepare(Method::POST, "/api/shipments/rates")).is_none());
    assert!(storage.load().is_none());
}

#[test]
fn no_credential_sends_anonymously() {
    let storage = MemoryTokenStorage::new();
    let gw = gateway_with(&storage, "http://localhost:5001");
    assert!(auth_header(gw.prepare(Method::POST, "/api/auth/login")).is_none());
}

#[test]
fn url_joins_base_and_path() {
    let gw = gateway_with(&MemoryTokenStorage::new(), "http://localhost:5001/");
    assert_eq!(gw.base_url(), "http://localhost:5001");
    assert_eq!(gw.url("/api/auth/me"), "http://localhost:5001/api/auth/me");
    assert_eq!(gw.url("api/orders"), "http://localhost:5001/api/orders");
}

// =============================================================================
// send: status mapping against a local server
// =============================================================================

async fn echo_auth(headers: HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_owned()
}

#[tokio::test]
async fn server_sees_bearer_header() {
    let base = serve(Router::new().route("/api/whoami", get(echo_auth))).await;
    let token = fresh_token(600);
    let gw = gateway_with(&MemoryTokenStorage::with_token(&token), &base);

    let seen = gw.get_json::<serde_json::Value>("/api/whoami").await.unwrap_err().to_string();
    // The echo body is plain text, so decoding as JSON fails; the header still arrived.
    assert!(seen.contains("decode"));

    let response = gw.send(gw.prepare(Method::GET, "/api/whoami")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), format!("Bearer {token}"));
}

#[tokio::test]
async fn expired_credential_is_gone_before_call_completes() {
    let base = serve(Router::new().route("/api/whoami", get(echo_auth))).await;
    let storage = MemoryTokenStorage::with_token(&expired_token(5));
    let gw = gateway_with(&storage, &base);

    let response = gw.send(gw.prepare(Method::GET, "/api/whoami")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "anonymous");
    assert!(storage.load().is_none());
}

async fn reject() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::UNAUTHORIZED, r#"{"error":"Invalid or expired token"}"#)
}

#[tokio::test]
async fn unauthorized_with_credential_purges_it() {
    let base = serve(Router::new().route("/api/orders", get(reject))).await;
    let token = fresh_token(600);
    let storage = MemoryTokenStorage::with_token(&token);
    let gw = gateway_with(&storage, &base);

    let err = gw.get_json::<serde_json::Value>("/api/orders").await.unwrap_err();
    assert_eq!(err.rejected_credential(), Some(token.as_str()));
    assert!(storage.load().is_none());
}

#[tokio::test]
async fn unauthorized_keeps_credential_replaced_mid_flight() {
    let base = serve(Router::new().route("/api/orders", get(reject))).await;
    let sent = fresh_token(600);
    let storage = MemoryTokenStorage::with_token(&sent);
    let gw = gateway_with(&storage, &base);

    let prepared = gw.prepare(Method::GET, "/api/orders");
    let newer = fresh_token(900);
    storage.save(&newer).unwrap();

    let err = gw.send(prepared).await.unwrap_err();
    assert_eq!(err.rejected_credential(), Some(sent.as_str()));
    assert_eq!(storage.load(), Some(newer));
}

#[tokio::test]
async fn anonymous_unauthorized_is_plain_status() {
    let base = serve(Router::new().route("/api/orders", get(reject))).await;
    let gw = gateway_with(&MemoryTokenStorage::new(), &base);

    let err = gw.get_json::<serde_json::Value>("/api/orders").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid or expired token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = gateway_with(&MemoryTokenStorage::new(), &format!("http://{addr}"));
    let err = gw.get_json::<serde_json::Value>("/api/orders").await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}

#[test]
fn anonymous_requests_skip_a_valid_credential() {
    let token = fresh_token(600);
    let storage = MemoryTokenStorage::with_token(&token);
    let gw = gateway_with(&storage, "http://localhost:5001");

    let prepared = gw.prepare_anonymous(Method::POST, "/api/auth/login");
    assert!(prepared.credential.is_none());
    assert!(auth_header(prepared).is_none());
    assert_eq!(storage.load(), Some(token));
}
