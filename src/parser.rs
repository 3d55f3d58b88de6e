//! Normalizer for Sky-Scrapper search payloads
//!
//! The API has answered in several shapes over time. [`ResponseShape::detect`]
//! probes for the known ones and a dedicated adapter pulls the itinerary list
//! out of each. Every itinerary then goes through the same leg/segment
//! extraction, which falls back through alternate field names and never fails:
//! a leg it cannot read is left out.

use crate::{FlightEndpoint, FlightPrice, FlightResult};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const UNKNOWN_AIRLINE: &str = "Unknown Airline";
const DEFAULT_CURRENCY: &str = "USD";

/// Known top-level layouts of a search payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ "data": { "itineraries": [...] } }`
    DataItineraries,
    /// `{ "itineraries": [...] }`
    TopLevelItineraries,
    /// `{ "data": [...] }`
    DataList,
    /// `[...]`
    BareList,
}

impl ResponseShape {
    /// Cheap structural probe; `None` means the payload is unusable
    pub fn detect(payload: &Value) -> Option<Self> {
        if payload.pointer("/data/itineraries").map_or(false, Value::is_array) {
            Some(ResponseShape::DataItineraries)
        } else if payload.get("itineraries").map_or(false, Value::is_array) {
            Some(ResponseShape::TopLevelItineraries)
        } else if payload.get("data").map_or(false, Value::is_array) {
            Some(ResponseShape::DataList)
        } else if payload.is_array() {
            Some(ResponseShape::BareList)
        } else {
            None
        }
    }

    fn itineraries<'a>(&self, payload: &'a Value) -> &'a [Value] {
        match self {
            ResponseShape::DataItineraries => itineraries_under_data(payload),
            ResponseShape::TopLevelItineraries => itineraries_at_top_level(payload),
            ResponseShape::DataList => data_as_itineraries(payload),
            ResponseShape::BareList => payload_as_itineraries(payload),
        }
    }
}

fn as_slice(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn itineraries_under_data(payload: &Value) -> &[Value] {
    as_slice(payload.pointer("/data/itineraries"))
}

fn itineraries_at_top_level(payload: &Value) -> &[Value] {
    as_slice(payload.get("itineraries"))
}

fn data_as_itineraries(payload: &Value) -> &[Value] {
    as_slice(payload.get("data"))
}

fn payload_as_itineraries(payload: &Value) -> &[Value] {
    as_slice(Some(payload))
}

/// Normalize a payload whose layout is recognized; `None` otherwise
pub fn parse_payload(payload: &Value) -> Option<Vec<FlightResult>> {
    let shape = ResponseShape::detect(payload)?;
    debug!(?shape, "Detected response shape");
    Some(normalize_itineraries(shape.itineraries(payload)))
}

/// Normalize a whole payload. Unrecognized layouts give an empty list.
pub fn normalize_response(payload: &Value) -> Vec<FlightResult> {
    parse_payload(payload).unwrap_or_else(|| {
        warn!("Unrecognized response shape, returning no flights");
        Vec::new()
    })
}

/// One result per readable leg across all itineraries
pub fn normalize_itineraries(itineraries: &[Value]) -> Vec<FlightResult> {
    let mut flights = Vec::new();
    let mut seen_ids = HashSet::new();

    for (itinerary_index, itinerary) in itineraries.iter().enumerate() {
        let Some(itinerary) = itinerary.as_object() else {
            debug!(itinerary_index, "Skipping itinerary that is not an object");
            continue;
        };

        let price = extract_price(itinerary);
        let booking_url = first_text(itinerary, &["deeplink", "bookingUrl"]);

        for (leg_index, leg) in as_slice(itinerary.get("legs")).iter().enumerate() {
            let Some(leg) = leg.as_object() else {
                debug!(itinerary_index, leg_index, "Skipping leg that is not an object");
                continue;
            };

            match normalize_leg(itinerary_index, leg_index, leg, &price, booking_url.as_deref()) {
                Some(mut flight) => {
                    flight.id = unique_id(flight.id, &mut seen_ids);
                    flights.push(flight);
                }
                None => debug!(itinerary_index, leg_index, "Skipping leg without segments"),
            }
        }
    }

    flights
}

fn normalize_leg(
    itinerary_index: usize,
    leg_index: usize,
    leg: &Map<String, Value>,
    price: &FlightPrice,
    booking_url: Option<&str>,
) -> Option<FlightResult> {
    let segments = leg.get("segments").and_then(Value::as_array)?;
    let main = segments.first()?.as_object()?;

    let flight_number = text(main.get("flightNumber")).unwrap_or_default();

    let airline = nested_text(main, "marketingCarrier", "name")
        .or_else(|| nested_text(main, "airline", "name"))
        .or_else(|| text(main.get("airline")))
        .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string());

    let aircraft = nested_text(main, "operatingCarrier", "name")
        .or_else(|| text(main.get("aircraft")))
        .unwrap_or_default();

    let departure = endpoint(
        nested_text(leg, "origin", "displayCode").or_else(|| text(leg.get("originAirport"))),
        present(main.get("departure")).or_else(|| present(leg.get("departure"))),
    );
    let arrival = endpoint(
        nested_text(leg, "destination", "displayCode")
            .or_else(|| text(leg.get("destinationAirport"))),
        present(main.get("arrival")).or_else(|| present(leg.get("arrival"))),
    );

    let minutes = positive_number(leg.get("durationInMinutes"))
        .or_else(|| positive_number(leg.get("duration")))
        .unwrap_or(0.0);

    let id = format!(
        "{}_{}",
        if flight_number.is_empty() {
            format!("itin{}", itinerary_index)
        } else {
            flight_number.clone()
        },
        text(leg.get("id")).unwrap_or_else(|| format!("leg{}", leg_index)),
    );

    Some(FlightResult {
        id,
        airline,
        flight_number,
        aircraft,
        departure,
        arrival,
        duration: format_duration(minutes as u64),
        stops: segments.len().saturating_sub(1) as u32,
        price: price.clone(),
        emissions: leg.get("emissions").and_then(|e| positive_number(e.get("total"))),
        booking_url: booking_url.map(str::to_string),
        destination: nested_text(leg, "destination", "city")
            .or_else(|| nested_text(leg, "destination", "name")),
    })
}

/// `price` or `pricing` object; a zero amount falls through to the next field
fn extract_price(itinerary: &Map<String, Value>) -> FlightPrice {
    if let Some(amount) = itinerary.get("price").and_then(Value::as_f64) {
        return FlightPrice {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
        };
    }

    let pricing = itinerary
        .get("price")
        .and_then(Value::as_object)
        .or_else(|| itinerary.get("pricing").and_then(Value::as_object));

    let Some(pricing) = pricing else {
        return FlightPrice {
            amount: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
        };
    };

    let amount = ["raw", "amount", "total"]
        .iter()
        .find_map(|key| positive_number(pricing.get(*key)))
        .unwrap_or(0.0);

    FlightPrice {
        amount,
        currency: text(pricing.get("currency")).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    }
}

/// Airport plus local time/date from either an ISO-8601 string or a `{time, date}` object
fn endpoint(airport: Option<String>, moment: Option<&Value>) -> FlightEndpoint {
    let (time, date) = match moment {
        Some(Value::String(stamp)) => split_timestamp(stamp),
        Some(Value::Object(fields)) => (
            text(fields.get("time")).unwrap_or_default(),
            text(fields.get("date")).unwrap_or_default(),
        ),
        _ => (String::new(), String::new()),
    };

    FlightEndpoint {
        airport: airport.unwrap_or_default(),
        time,
        date,
    }
}

/// "2025-08-15T14:30:00" -> ("14:30", "2025-08-15")
fn split_timestamp(stamp: &str) -> (String, String) {
    match stamp.split_once('T') {
        Some((date, rest)) => (rest.chars().take(5).collect(), date.to_string()),
        None => (String::new(), stamp.to_string()),
    }
}

/// "Xh Ym"
pub fn format_duration(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn unique_id(id: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(id.clone()) {
        return id;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", id, n);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Skip null and empty strings the way a falsy check would
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// Non-empty string, or a number rendered as text
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn nested_text(object: &Map<String, Value>, key: &str, inner: &str) -> Option<String> {
    text(object.get(key)?.get(inner))
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(object.get(*key)))
}

/// Finite, non-zero number (numeric strings accepted)
fn positive_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (number.is_finite() && number > 0.0).then_some(number)
}
