//! Shipment rate requests.
//!
//! Request validation plus the providers that turn a request into carrier
//! quotes. Quotes travel through the same authenticated gateway as every
//! other data call.

pub mod rates;
pub mod types;

pub use rates::{BackendRates, MockRates, RateProvider};
pub use types::{Address, DeliveryAccuracy, Parcel, Rate, ShipmentRequest, ShipmentResponse, SmartRate, ValidationError};
