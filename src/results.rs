//! Ordering and stop filtering for result lists shown to the user

use crate::{FlightError, FlightResult};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Price,
    Duration,
    Departure,
}

impl FromStr for SortKey {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortKey::Price),
            "duration" => Ok(SortKey::Duration),
            "departure" => Ok(SortKey::Departure),
            _ => Err(FlightError::ParseError(format!("Invalid sort key: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopsFilter {
    #[default]
    All,
    Nonstop,
    OneStop,
    MultipleStops,
}

impl StopsFilter {
    pub fn matches(&self, flight: &FlightResult) -> bool {
        match self {
            StopsFilter::All => true,
            StopsFilter::Nonstop => flight.stops == 0,
            StopsFilter::OneStop => flight.stops == 1,
            StopsFilter::MultipleStops => flight.stops > 1,
        }
    }
}

impl FromStr for StopsFilter {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StopsFilter::All),
            "nonstop" | "0" => Ok(StopsFilter::Nonstop),
            "one" | "1" => Ok(StopsFilter::OneStop),
            "multiple" | "2+" => Ok(StopsFilter::MultipleStops),
            _ => Err(FlightError::ParseError(format!("Invalid stops filter: {}", s))),
        }
    }
}

/// Minutes from an "Xh Ym" string
pub fn duration_minutes(duration: &str) -> Option<u64> {
    let (hours, rest) = duration.trim().split_once('h')?;
    let minutes = rest.trim().strip_suffix('m')?;
    Some(hours.trim().parse::<u64>().ok()? * 60 + minutes.trim().parse::<u64>().ok()?)
}

/// Stable sort; unreadable durations go last
pub fn sort_flights(flights: &mut [FlightResult], key: SortKey) {
    match key {
        SortKey::Price => flights.sort_by(|a, b| a.price.amount.total_cmp(&b.price.amount)),
        SortKey::Duration => flights.sort_by(|a, b| {
            match (duration_minutes(&a.duration), duration_minutes(&b.duration)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortKey::Departure => flights.sort_by(|a, b| {
            (&a.departure.date, &a.departure.time).cmp(&(&b.departure.date, &b.departure.time))
        }),
    }
}

pub fn filter_by_stops(flights: Vec<FlightResult>, filter: StopsFilter) -> Vec<FlightResult> {
    flights.into_iter().filter(|f| filter.matches(f)).collect()
}
