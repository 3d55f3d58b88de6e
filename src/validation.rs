//! Search request validation, run before any network or cache work

use crate::{SearchRequest, TripType};
use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a search request is rejected up front
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Origin location is required (minimum 2 characters)")]
    OriginTooShort,

    #[error("Destination location is required (minimum 2 characters)")]
    DestinationTooShort,

    #[error("Departure date is required")]
    MissingDepartureDate,

    #[error("Return date is required for round trips")]
    MissingReturnDate,

    #[error("At least one adult passenger is required")]
    NoAdults,

    #[error("Departure date cannot be in the past")]
    DepartureInPast,

    #[error("Return date must be after departure date")]
    ReturnNotAfterDeparture,
}

const MIN_LOCATION_CHARS: usize = 2;

/// Check a request against `today`; the first failing rule wins
pub fn validate_request(request: &SearchRequest, today: NaiveDate) -> Result<(), ValidationError> {
    if request.origin.trim().chars().count() < MIN_LOCATION_CHARS {
        return Err(ValidationError::OriginTooShort);
    }
    if request.destination.trim().chars().count() < MIN_LOCATION_CHARS {
        return Err(ValidationError::DestinationTooShort);
    }

    let departure = request
        .departure_date
        .ok_or(ValidationError::MissingDepartureDate)?;

    if request.trip_type == TripType::RoundTrip && request.return_date.is_none() {
        return Err(ValidationError::MissingReturnDate);
    }
    if request.passengers.adults < 1 {
        return Err(ValidationError::NoAdults);
    }
    if departure < today {
        return Err(ValidationError::DepartureInPast);
    }
    if let Some(return_date) = request.return_date {
        if return_date <= departure {
            return Err(ValidationError::ReturnNotAfterDeparture);
        }
    }

    Ok(())
}
