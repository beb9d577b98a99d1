//! Rate shopping providers.
//!
//! DESIGN
//! ======
//! `BackendRates` forwards a validated request to the backend through the
//! authenticated gateway. `MockRates` answers locally from a fixed price
//! table so the front end can be exercised without a carrier account; its
//! prices are synthetic and its delivery accuracy is random.

use std::sync::Arc;

use rand::Rng;
use time::Date;

use super::types::{DeliveryAccuracy, Rate, ShipmentRequest, ShipmentResponse, SmartRate};
use crate::net::{ApiError, Gateway, api};

const SHIPMENT_ID_PREFIX: &str = "shp_";
const SHIPMENT_ID_LEN: usize = 6;
const SHIPMENT_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `(carrier, service, per-ounce, base, transit days)`.
type PriceRow = (&'static str, &'static str, f64, f64, u32);

const DOMESTIC_TABLE: [PriceRow; 5] = [
    ("USPS", "Priority Mail", 0.5, 7.99, 2),
    ("USPS", "Express Mail", 0.7, 23.99, 1),
    ("UPS", "Ground", 0.6, 8.99, 3),
    ("UPS", "2nd Day Air", 0.8, 14.99, 2),
    ("FedEx", "Ground", 0.55, 9.99, 3),
];

const INTERNATIONAL_TABLE: [PriceRow; 2] = [
    ("DHL", "International Express", 2.2, 49.99, 4),
    ("FedEx", "International Priority", 2.5, 59.99, 3),
];

const FIRST_RATE_ID: u32 = 123;

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// Quote every available service for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the quote cannot be obtained.
    async fn quote(&self, request: &ShipmentRequest) -> Result<ShipmentResponse, ApiError>;
}

// =============================================================================
// BACKEND
// =============================================================================

pub struct BackendRates {
    gateway: Arc<Gateway>,
}

impl BackendRates {
    #[must_use]
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl RateProvider for BackendRates {
    async fn quote(&self, request: &ShipmentRequest) -> Result<ShipmentResponse, ApiError> {
        api::request_rates(&self.gateway, request).await
    }
}

// =============================================================================
// MOCK
// =============================================================================

/// Local price table. `today` pins the delivery-date calendar; `None` uses
/// the current UTC date.
#[derive(Debug, Clone, Default)]
pub struct MockRates {
    today: Option<Date>,
}

impl MockRates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_today(today: Date) -> Self {
        Self { today: Some(today) }
    }

    /// Build a quote synchronously.
    #[must_use]
    pub fn build_quote(&self, request: &ShipmentRequest) -> ShipmentResponse {
        let today = self.today.unwrap_or_else(|| time::OffsetDateTime::now_utc().date());
        let weight = request.parcel.weight;

        let international: &[PriceRow] = if request.is_international() { &INTERNATIONAL_TABLE } else { &[] };
        let rates: Vec<Rate> = DOMESTIC_TABLE
            .iter()
            .chain(international)
            .zip(FIRST_RATE_ID..)
            .map(|(&(carrier, service, per_ounce, base, days), id)| Rate {
                id: format!("rate_{id}"),
                carrier: carrier.to_owned(),
                service: service.to_owned(),
                rate: format!("{:.2}", weight * per_ounce + base),
                delivery_days: days,
                delivery_date: delivery_date(today, days),
                est_delivery_days: None,
            })
            .collect();

        let mut rng = rand::rng();
        let smartrates = rates
            .iter()
            .map(|rate| SmartRate {
                rate: Rate { est_delivery_days: Some(rate.delivery_days), ..rate.clone() },
                time_in_transit: rate.delivery_days,
                delivery_date_guaranteed: rate.carrier != "USPS",
                delivery_accuracy: Some(DeliveryAccuracy::ALL[rng.random_range(0..DeliveryAccuracy::ALL.len())]),
            })
            .collect();

        let response = ShipmentResponse {
            id: shipment_id(&mut rng),
            object: "Shipment".to_owned(),
            status: "created".to_owned(),
            tracking_code: None,
            rates,
            smartrates,
            selected_rate: None,
        };
        tracing::debug!(id = %response.id, rates = response.rates.len(), "mock quote built");
        response
    }
}

#[async_trait::async_trait]
impl RateProvider for MockRates {
    async fn quote(&self, request: &ShipmentRequest) -> Result<ShipmentResponse, ApiError> {
        Ok(self.build_quote(request))
    }
}

fn delivery_date(today: Date, days: u32) -> Option<String> {
    today.checked_add(time::Duration::days(i64::from(days))).map(|d| d.to_string())
}

fn shipment_id(rng: &mut impl Rng) -> String {
    let suffix: String = (0..SHIPMENT_ID_LEN)
        .map(|_| SHIPMENT_ID_ALPHABET[rng.random_range(0..SHIPMENT_ID_ALPHABET.len())] as char)
        .collect();
    format!("{SHIPMENT_ID_PREFIX}{suffix}")
}

#[cfg(test)]
#[path = "rates_test.rs"]
mod tests;
