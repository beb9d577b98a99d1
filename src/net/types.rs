//! Wire types shared by the auth and data endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::{Company, Identity};

// =============================================================================
// AUTH PAYLOADS
// =============================================================================

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "company_id", skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(rename = "role_id", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("company_id", &self.company_id)
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Body of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Identity,
    #[serde(default)]
    pub company: Option<Company>,
}

/// Body of `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeResponse {
    pub user: Identity,
    #[serde(default)]
    pub company: Option<Company>,
}

// =============================================================================
// LIST RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    pub date: String,
    pub items: u32,
    pub status: String,
    pub value: String,
}

impl Order {
    /// Case-insensitive match on id or customer.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        contains_ci(&self.id, term) || contains_ci(&self.customer, term)
    }

    #[must_use]
    pub fn status_label(&self) -> &str {
        match self.status.as_str() {
            "processing" => "Processing",
            "ready_to_ship" => "Ready to Ship",
            "shipped" => "Shipped",
            "delivered" => "Delivered",
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub tracking: String,
    pub carrier: String,
    pub service: String,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub status: String,
}

impl Shipment {
    /// Case-insensitive match on id, tracking code, or carrier.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        contains_ci(&self.id, term) || contains_ci(&self.tracking, term) || contains_ci(&self.carrier, term)
    }

    #[must_use]
    pub fn status_label(&self) -> &str {
        match self.status.as_str() {
            "created" => "Created",
            "in_transit" => "In Transit",
            "out_for_delivery" => "Out for Delivery",
            "delivered" => "Delivered",
            "exception" => "Exception",
            other => other,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Role ids are strings or integers depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RecordId,
    pub name: String,
}

// =============================================================================
// LIST ENVELOPES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrdersBody {
    List(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

impl From<OrdersBody> for Vec<Order> {
    fn from(body: OrdersBody) -> Self {
        match body {
            OrdersBody::List(orders) | OrdersBody::Wrapped { orders } => orders,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ShipmentsBody {
    List(Vec<Shipment>),
    Wrapped { shipments: Vec<Shipment> },
}

impl From<ShipmentsBody> for Vec<Shipment> {
    fn from(body: ShipmentsBody) -> Self {
        match body {
            ShipmentsBody::List(shipments) | ShipmentsBody::Wrapped { shipments } => shipments,
        }
    }
}

/// Body of `GET /api/admin/users`.
#[derive(Debug, Deserialize)]
pub(crate) struct UsersBody {
    pub users: Vec<Identity>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
