//! Synthetic result set used when every upstream endpoint has failed
//!
//! Results are deterministic for a given request. With `seed` the 32-bit
//! FNV-1a hash of the request's cache key and `base = 200 + seed % 500`,
//! entry `i` costs `base + 30 * i - 50` USD and emits `120 + 10 * i` kg.

use crate::airports::airport_code;
use crate::cache::cache_key;
use crate::{FlightEndpoint, FlightPrice, FlightResult, SearchRequest};

pub const PLACEHOLDER_COUNT: usize = 5;

struct Destination {
    city: &'static str,
    airport: &'static str,
    airline: &'static str,
    flight: &'static str,
    duration: &'static str,
}

const DESTINATIONS: [Destination; PLACEHOLDER_COUNT] = [
    Destination {
        city: "Lisbon",
        airport: "LIS",
        airline: "TAP Air Portugal",
        flight: "TP 439",
        duration: "1h 20m",
    },
    Destination {
        city: "Paris",
        airport: "CDG",
        airline: "Air France",
        flight: "AF 1028",
        duration: "1h 55m",
    },
    Destination {
        city: "London",
        airport: "LHR",
        airline: "British Airways",
        flight: "BA 458",
        duration: "2h 25m",
    },
    Destination {
        city: "Rome",
        airport: "FCO",
        airline: "Alitalia",
        flight: "AZ 78",
        duration: "2h 30m",
    },
    Destination {
        city: "Amsterdam",
        airport: "AMS",
        airline: "KLM",
        flight: "KL 1678",
        duration: "2h 45m",
    },
];

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Seed derived from the request's cache key
pub fn placeholder_seed(request: &SearchRequest) -> u32 {
    fnv1a(cache_key(request).as_bytes())
}

/// Price of the first entry; later entries add 30 each
pub fn base_price(request: &SearchRequest) -> u32 {
    200 + placeholder_seed(request) % 500 - 50
}

pub fn placeholder_flights(request: &SearchRequest) -> Vec<FlightResult> {
    let base = base_price(request);
    let origin = airport_code(&request.origin);
    let date = request
        .departure_date
        .map(|date| date.to_string())
        .unwrap_or_default();

    DESTINATIONS
        .iter()
        .enumerate()
        .map(|(index, dest)| FlightResult {
            id: format!("placeholder_{}", index + 1),
            airline: dest.airline.to_string(),
            flight_number: dest.flight.to_string(),
            aircraft: "Boeing 737".to_string(),
            departure: FlightEndpoint {
                airport: origin.clone(),
                time: "14:30".to_string(),
                date: date.clone(),
            },
            arrival: FlightEndpoint {
                airport: dest.airport.to_string(),
                time: "16:45".to_string(),
                date: date.clone(),
            },
            duration: dest.duration.to_string(),
            stops: 0,
            price: FlightPrice {
                amount: f64::from(base + 30 * index as u32),
                currency: "USD".to_string(),
            },
            emissions: Some(f64::from(120 + 10 * index as u32)),
            booking_url: None,
            destination: Some(dest.city.to_string()),
        })
        .collect()
}
