//! # Flight Gateway
//!
//! Client-side access layer for the Sky-Scrapper flight search API.
//! A [`FlightSearchGateway`] validates trip parameters, enforces a rolling
//! request cap, serves repeated searches from a short-lived cache and walks
//! an ordered list of upstream endpoints, normalizing whatever comes back
//! into a uniform list of [`FlightResult`] records.

pub mod airports;
pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod parser;
pub mod placeholder;
pub mod rate_limit;
pub mod results;
pub mod validation;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use client::{FlightClient, Transport, UpstreamQuery};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiEndpoint, CacheConfig, GatewayConfig, RateLimitConfig};
pub use gateway::FlightSearchGateway;
pub use parser::{format_duration, normalize_response, parse_payload, ResponseShape};
pub use results::{filter_by_stops, sort_flights, SortKey, StopsFilter};
pub use validation::{validate_request, ValidationError};

/// Error types for the gateway
#[derive(Error, Debug)]
pub enum FlightError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API request failed: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unrecognized response shape from {endpoint}")]
    UnrecognizedResponse { endpoint: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded. Please wait before making another request.")]
    RateLimited { reset_time: i64 },

    #[error("API key not configured. Please set RAPIDAPI_KEY in your environment.")]
    NotConfigured,

    #[error("Flight search is temporarily unavailable. Please try again later.")]
    UpstreamUnavailable,

    #[error("Parsing failed: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Passenger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants_in_seat: u32,
    pub infants_on_lap: u32,
}

impl Passengers {
    /// Infants as the upstream counts them (seated and lap together)
    pub fn infants(&self) -> u32 {
        self.infants_in_seat + self.infants_on_lap
    }
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants_in_seat: 0,
            infants_on_lap: 0,
        }
    }
}

/// Trip type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one-way",
            TripType::RoundTrip => "round-trip",
            TripType::MultiCity => "multi-city",
        }
    }
}

impl FromStr for TripType {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round-trip" | "roundtrip" => Ok(TripType::RoundTrip),
            "one-way" | "oneway" => Ok(TripType::OneWay),
            "multi-city" | "multicity" => Ok(TripType::MultiCity),
            _ => Err(FlightError::ParseError(format!("Invalid trip type: {}", s))),
        }
    }
}

/// Cabin class enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium-economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }

    /// Spelling used in upstream query strings
    pub fn upstream_name(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl FromStr for CabinClass {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "economy" => Ok(CabinClass::Economy),
            "premium-economy" | "premium_economy" | "premiumeconomy" => {
                Ok(CabinClass::PremiumEconomy)
            }
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            _ => Err(FlightError::ParseError(format!("Invalid cabin class: {}", s))),
        }
    }
}

/// Trip parameters collected from the search form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin: String,                    // Place name or 3-letter code
    pub destination: String,               // Place name or 3-letter code
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,    // Required for round trips
    pub passengers: Passengers,
    pub cabin_class: CabinClass,
    pub trip_type: TripType,
}

impl SearchRequest {
    /// One-way economy search for a single adult
    pub fn one_way(origin: &str, destination: &str, departure_date: NaiveDate) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure_date: Some(departure_date),
            return_date: None,
            passengers: Passengers::default(),
            cabin_class: CabinClass::Economy,
            trip_type: TripType::OneWay,
        }
    }

    /// Round-trip economy search for a single adult
    pub fn round_trip(
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            return_date: Some(return_date),
            trip_type: TripType::RoundTrip,
            ..Self::one_way(origin, destination, departure_date)
        }
    }

    pub fn with_passengers(mut self, passengers: Passengers) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn with_cabin_class(mut self, cabin_class: CabinClass) -> Self {
        self.cabin_class = cabin_class;
        self
    }
}

/// Airport, local time and date at one end of a flight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub airport: String,
    pub time: String, // HH:MM
    pub date: String, // YYYY-MM-DD
}

/// Price information with amount and currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPrice {
    pub amount: f64,
    pub currency: String,
}

impl fmt::Display for FlightPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

/// Normalized flight record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResult {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub aircraft: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration: String, // "Xh Ym"
    pub stops: u32,
    pub price: FlightPrice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Result set carried by a successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub outbound: Vec<FlightResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<Vec<FlightResult>>,
    pub search_id: String,
    pub currency: String,
    pub total_results: usize,
    /// Set when every upstream endpoint failed and synthetic results were substituted
    #[serde(default)]
    pub placeholder: bool,
}

/// Remaining requests in the current window and when it resets (epoch ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSnapshot {
    pub remaining: u32,
    pub reset_time: i64,
}

/// Envelope returned to the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SearchResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitSnapshot>,
}

impl SearchResponse {
    pub fn ok(data: SearchResults, rate_limit: RateLimitSnapshot) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            rate_limit: Some(rate_limit),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            rate_limit: None,
        }
    }

    /// Failure envelope for an error surfaced to the caller
    pub fn from_error(err: &FlightError) -> Self {
        match err {
            FlightError::RateLimited { reset_time } => Self {
                rate_limit: Some(RateLimitSnapshot {
                    remaining: 0,
                    reset_time: *reset_time,
                }),
                ..Self::failure(err.to_string())
            },
            _ => Self::failure(err.to_string()),
        }
    }

    /// Outbound results, or an empty slice for failures
    pub fn flights(&self) -> &[FlightResult] {
        self.data
            .as_ref()
            .map(|data| data.outbound.as_slice())
            .unwrap_or(&[])
    }
}
