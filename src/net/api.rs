//! Data endpoints used by the list and rate views.
//!
//! ERROR HANDLING
//! ==============
//! Every function returns the gateway's `ApiError` unchanged. These are
//! action-level failures: the caller shows them inline and the session is
//! left alone, except that a rejected credential was already purged by the
//! gateway before the error arrives here.

use super::error::ApiError;
use super::gateway::Gateway;
use super::types::{Order, OrdersBody, RoleRecord, Shipment, ShipmentsBody, UsersBody};
use crate::auth::Identity;
use crate::shipping::{ShipmentRequest, ShipmentResponse};

pub const ORDERS_PATH: &str = "/api/orders";
pub const SHIPMENTS_PATH: &str = "/api/shipments";
pub const ADMIN_USERS_PATH: &str = "/api/admin/users";
pub const ROLES_PATH: &str = "/api/roles";
pub const RATES_PATH: &str = "/api/shipments/rates";

const INVALID_USERS_FORMAT: &str = "Received invalid data format for users.";

/// # Errors
///
/// Returns an [`ApiError`] if the request or decode fails.
pub async fn fetch_orders(gateway: &Gateway) -> Result<Vec<Order>, ApiError> {
    let body: OrdersBody = gateway.get_json(ORDERS_PATH).await?;
    Ok(body.into())
}

/// # Errors
///
/// Returns an [`ApiError`] if the request or decode fails.
pub async fn fetch_shipments(gateway: &Gateway) -> Result<Vec<Shipment>, ApiError> {
    let body: ShipmentsBody = gateway.get_json(SHIPMENTS_PATH).await?;
    Ok(body.into())
}

/// Fetch the administrator's user list.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request fails, or `Decode` when the body
/// lacks a `users` array.
pub async fn fetch_admin_users(gateway: &Gateway) -> Result<Vec<Identity>, ApiError> {
    let body: serde_json::Value = gateway.get_json(ADMIN_USERS_PATH).await?;
    let parsed: UsersBody = serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, "unexpected admin users payload");
        ApiError::Decode(INVALID_USERS_FORMAT.to_owned())
    })?;
    Ok(parsed.users)
}

/// # Errors
///
/// Returns an [`ApiError`] if the request or decode fails.
pub async fn fetch_roles(gateway: &Gateway) -> Result<Vec<RoleRecord>, ApiError> {
    gateway.get_json(ROLES_PATH).await
}

/// Ask the backend to quote carrier rates for `request`.
///
/// # Errors
///
/// Returns an [`ApiError`] if the request or decode fails.
pub async fn request_rates(gateway: &Gateway, request: &ShipmentRequest) -> Result<ShipmentResponse, ApiError> {
    gateway.post_json(RATES_PATH, request).await
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
