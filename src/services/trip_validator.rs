//! Business rules for a trip selection.
//!
//! Every rule is evaluated independently so a client gets the full list of
//! problems in one round trip. The validator is pure: it sees the requested
//! trip, the flights that resolved from the store and the captured request
//! time, and never touches storage itself.

use crate::config::TripPolicy;
use crate::models::flight::Flight;
use crate::models::trip::{TripRequest, TripType};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripViolation {
    #[error("Some flights do not exist")]
    UnknownFlights,

    #[error("One-way trips must have exactly one flight")]
    OneWayFlightCount,

    #[error("Round-trip must have exactly two flights")]
    RoundTripFlightCount,

    #[error("Multi-city trips cannot have more than {max} flights")]
    TooManyFlights { max: usize },

    #[error("Multi-city trips must have at least {min} flights")]
    TooFewFlights { min: usize },

    #[error("Departure date cannot be more than {days} days from now")]
    DepartureTooFar { days: i64 },

    #[error("Return flight must depart after the outbound flight")]
    ReturnBeforeOutbound,

    #[error("Each multi-city flight must depart on a later date than the previous one")]
    LegsOutOfOrder,

    #[error("Trips cannot contain the same flight more than once")]
    RepeatedFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripValidation {
    pub violations: Vec<TripViolation>,
    /// Sum of the prices of the flights that resolved.
    pub total_price: Decimal,
}

impl TripValidation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

pub fn validate_trip(
    request: &TripRequest,
    flights: &[Flight],
    requested_at: DateTime<Utc>,
    policy: &TripPolicy,
) -> TripValidation {
    let mut violations = Vec::new();

    // Legs in itinerary order; `None` for ids that did not resolve
    let legs: Vec<Option<&Flight>> = request
        .flights
        .iter()
        .map(|id| flights.iter().find(|flight| flight.id == *id))
        .collect();
    let all_resolved = legs.iter().all(Option::is_some);
    if !all_resolved {
        violations.push(TripViolation::UnknownFlights);
    }

    let total_price = flights
        .iter()
        .filter(|flight| request.flights.contains(&flight.id))
        .map(|flight| flight.price)
        .sum();

    let count = request.flights.len();
    match request.trip_type {
        TripType::OneWay if count != 1 => violations.push(TripViolation::OneWayFlightCount),
        TripType::RoundTrip if count != 2 => {
            violations.push(TripViolation::RoundTripFlightCount)
        }
        TripType::MultiCity => {
            if count > policy.max_flights {
                violations.push(TripViolation::TooManyFlights {
                    max: policy.max_flights,
                });
            }
            if count < policy.min_multi_city_flights {
                violations.push(TripViolation::TooFewFlights {
                    min: policy.min_multi_city_flights,
                });
            }
        }
        _ => {}
    }

    // A horizon past the calendar's end bounds nothing
    let horizon = requested_at
        .date_naive()
        .checked_add_signed(Duration::days(policy.max_days_ahead));
    if horizon.is_some_and(|horizon| request.departure_date > horizon) {
        violations.push(TripViolation::DepartureTooFar {
            days: policy.max_days_ahead,
        });
    }

    if all_resolved {
        let legs: Vec<&Flight> = legs.into_iter().flatten().collect();
        match request.trip_type {
            TripType::RoundTrip if legs.len() == 2 => {
                if legs[1].departure_time <= legs[0].departure_time {
                    violations.push(TripViolation::ReturnBeforeOutbound);
                }
            }
            TripType::MultiCity => {
                let chronological = legs.windows(2).all(|pair| {
                    pair[1].departure_time.date() > pair[0].departure_time.date()
                });
                if !chronological {
                    violations.push(TripViolation::LegsOutOfOrder);
                }
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    if !request.flights.iter().all(|id| seen.insert(*id)) {
        violations.push(TripViolation::RepeatedFlight);
    }

    TripValidation {
        violations,
        total_price,
    }
}
