//! Shipment rate request and response shapes.
//!
//! Field names follow the carrier aggregator's wire format (`from_address`,
//! `delivery_days`, `smartrates`, ...) so bodies pass through unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest accepted parcel dimension or weight.
pub const MIN_PARCEL_MEASURE: f64 = 0.1;

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub street1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Parcel dimensions in inches, weight in ounces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub from_address: Address,
    pub to_address: Address,
    pub parcel: Parcel,
}

impl ShipmentRequest {
    /// True when the destination is outside the United States.
    #[must_use]
    pub fn is_international(&self) -> bool {
        self.to_address.country != "US"
    }

    /// Check required fields and parcel bounds, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing each offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_address("from", &self.from_address, &mut issues);
        check_address("to", &self.to_address, &mut issues);

        let p = &self.parcel;
        for (field, value, message) in [
            ("length", p.length, "Length must be greater than 0"),
            ("width", p.width, "Width must be greater than 0"),
            ("height", p.height, "Height must be greater than 0"),
            ("weight", p.weight, "Weight must be greater than 0"),
        ] {
            if value.is_nan() || value < MIN_PARCEL_MEASURE {
                issues.push(FieldIssue::new(format!("parcel.{field}"), message));
            }
        }

        if issues.is_empty() { Ok(()) } else { Err(ValidationError { issues }) }
    }
}

fn check_address(side: &str, addr: &Address, issues: &mut Vec<FieldIssue>) {
    let required = [
        ("name", addr.name.as_deref().unwrap_or_default(), "Name is required"),
        ("street1", addr.street1.as_str(), "Street address is required"),
        ("city", addr.city.as_str(), "City is required"),
        ("state", addr.state.as_str(), "State is required"),
        ("zip", addr.zip.as_str(), "Zip code is required"),
        ("country", addr.country.as_str(), "Country is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            issues.push(FieldIssue::new(format!("{side}_address.{field}"), message));
        }
    }
    if let Some(email) = addr.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        if !looks_like_email(email) {
            issues.push(FieldIssue::new(format!("{side}_address.email"), "Invalid email address"));
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path such as `to_address.zip`.
    pub field: String,
    pub message: &'static str,
}

impl FieldIssue {
    fn new(field: String, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid shipment request: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Confidence that a carrier meets its quoted delivery date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryAccuracy {
    #[serde(rename = "percentile_50")]
    P50,
    #[serde(rename = "percentile_75")]
    P75,
    #[serde(rename = "percentile_85")]
    P85,
    #[serde(rename = "percentile_90")]
    P90,
    #[serde(rename = "percentile_95")]
    P95,
    #[serde(rename = "percentile_97")]
    P97,
    #[serde(rename = "percentile_99")]
    P99,
}

impl DeliveryAccuracy {
    pub const ALL: [Self; 7] = [Self::P50, Self::P75, Self::P85, Self::P90, Self::P95, Self::P97, Self::P99];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::P50 => "50%",
            Self::P75 => "75%",
            Self::P85 => "85%",
            Self::P90 => "90%",
            Self::P95 => "95%",
            Self::P97 => "97%",
            Self::P99 => "99%",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub id: String,
    pub carrier: String,
    pub service: String,
    /// Decimal price string, two fraction digits.
    pub rate: String,
    pub delivery_days: u32,
    pub delivery_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_delivery_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartRate {
    #[serde(flatten)]
    pub rate: Rate,
    pub time_in_transit: u32,
    pub delivery_date_guaranteed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_accuracy: Option<DeliveryAccuracy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentResponse {
    pub id: String,
    pub object: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub smartrates: Vec<SmartRate>,
    pub selected_rate: Option<Rate>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
