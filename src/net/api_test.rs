use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::auth::Role;
use crate::config::ClientConfig;
use crate::shipping::{MockRates, Parcel};
use crate::shipping::types::Address;
use crate::storage::{MemoryTokenStorage, TokenStorage};
use crate::test_helpers::{fresh_token, serve};

async fn gateway_for(app: Router) -> (Gateway, MemoryTokenStorage) {
    let base = serve(app).await;
    let storage = MemoryTokenStorage::with_token(&fresh_token(600));
    let config = ClientConfig::new(&base, "/unused").unwrap();
    (Gateway::new(&config, Arc::new(storage.clone())).unwrap(), storage)
}

fn order_json(id: &str) -> Value {
    json!({
        "id": id,
        "customer": "ABC Company",
        "date": "May 15, 2025",
        "items": 3,
        "status": "processing",
        "value": "$529.99"
    })
}

#[tokio::test]
async fn orders_accept_bare_list() {
    let app = Router::new().route(ORDERS_PATH, get(|| async { Json(json!([order_json("ORD-1"), order_json("ORD-2")])) }));
    let (gw, _) = gateway_for(app).await;

    let orders = fetch_orders(&gw).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].id, "ORD-2");
}

#[tokio::test]
async fn shipments_accept_wrapped_list() {
    let app = Router::new().route(
        SHIPMENTS_PATH,
        get(|| async {
            Json(json!({ "shipments": [{
                "id": "SHP-1",
                "tracking": "EZ1",
                "carrier": "UPS",
                "service": "Ground",
                "origin": "Oakland, CA",
                "destination": "Reno, NV",
                "date": "May 12, 2025",
                "status": "in_transit"
            }]}))
        }),
    );
    let (gw, _) = gateway_for(app).await;

    let shipments = fetch_shipments(&gw).await.unwrap();
    assert_eq!(shipments[0].status_label(), "In Transit");
}

#[tokio::test]
async fn admin_users_unwraps_users_field() {
    let app = Router::new().route(
        ADMIN_USERS_PATH,
        get(|| async { Json(json!({ "users": [{ "id": "u9", "email": "ops@x.com", "roles": ["Company Admin"] }] })) }),
    );
    let (gw, _) = gateway_for(app).await;

    let users = fetch_admin_users(&gw).await.unwrap();
    assert_eq!(users[0].roles, vec![Role::CompanyAdmin]);
}

#[tokio::test]
async fn admin_users_without_users_array_is_invalid_format() {
    let app = Router::new().route(ADMIN_USERS_PATH, get(|| async { Json(json!({ "data": [] })) }));
    let (gw, storage) = gateway_for(app).await;

    match fetch_admin_users(&gw).await.unwrap_err() {
        ApiError::Decode(msg) => assert_eq!(msg, INVALID_USERS_FORMAT),
        other => panic!("unexpected error: {other}"),
    }
    assert!(storage.load().is_some());
}

#[tokio::test]
async fn roles_accept_numeric_ids() {
    let app = Router::new().route(ROLES_PATH, get(|| async { Json(json!([{ "id": 1, "name": "Super Admin" }])) }));
    let (gw, _) = gateway_for(app).await;

    let roles = fetch_roles(&gw).await.unwrap();
    assert_eq!(roles[0].id.to_string(), "1");
}

#[tokio::test]
async fn rates_post_request_body() {
    // Echo back a mock quote for whatever request arrives.
    let app = Router::new().route(
        RATES_PATH,
        post(|Json(req): Json<ShipmentRequest>| async move { Json(MockRates::new().build_quote(&req)) }),
    );
    let (gw, _) = gateway_for(app).await;

    let addr = Address {
        name: Some("A".into()),
        street1: "1 Main".into(),
        city: "Toronto".into(),
        state: "ON".into(),
        zip: "M5V".into(),
        country: "CA".into(),
        ..Address::default()
    };
    let req = ShipmentRequest {
        from_address: addr.clone(),
        to_address: addr,
        parcel: Parcel { length: 1.0, width: 1.0, height: 1.0, weight: 1.0 },
    };
    let quote = request_rates(&gw, &req).await.unwrap();
    assert_eq!(quote.rates.len(), 7);
}

#[tokio::test]
async fn server_error_leaves_credential_in_place() {
    let app = Router::new().route(
        ORDERS_PATH,
        get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "db down" }))) }),
    );
    let (gw, storage) = gateway_for(app).await;

    let err = fetch_orders(&gw).await.unwrap_err();
    assert_eq!(err.to_string(), "server returned 500: db down");
    assert!(storage.load().is_some());
}
