//! Storage seams.
//!
//! Services only talk to these traits. [`mysql::MysqlStore`] backs them with
//! a MySQL pool; [`memory::InMemoryStore`] keeps everything in process for
//! demos and tests.

pub mod memory;
pub mod mysql;

use crate::models::catalog::{Airline, Airport, AirportFilter};
use crate::models::flight::{Flight, FlightQuery};
use crate::models::response::Page;
use crate::models::trip::{NewTrip, Trip, TripQuery};
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// Read access to airline and airport reference data.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_airlines(&self) -> AppResult<Vec<Airline>>;

    async fn find_airline(&self, id: i32) -> AppResult<Option<Airline>>;

    async fn list_airports(&self, filter: &AirportFilter) -> AppResult<Vec<Airport>>;

    async fn search_airports(&self, text: &str) -> AppResult<Vec<Airport>>;

    async fn find_airport(&self, id: i32) -> AppResult<Option<Airport>>;
}

#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Filtered, sorted, paginated flights.
    async fn search_flights(&self, query: &FlightQuery) -> AppResult<Page<Flight>>;

    async fn find_flight(&self, id: i32) -> AppResult<Option<Flight>>;

    /// Flights for the given ids; unknown ids are absent from the result.
    async fn find_flights(&self, ids: &[i32]) -> AppResult<Vec<Flight>>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Open a unit of work for writing one trip.
    async fn begin(&self) -> AppResult<Box<dyn TripTransaction>>;

    /// A committed trip with its flights in itinerary order.
    async fn find_trip(&self, id: i32) -> AppResult<Option<Trip>>;

    async fn list_trips(&self, query: &TripQuery) -> AppResult<Page<Trip>>;
}

/// Writes staged here become visible to readers only after [`commit`].
///
/// [`commit`]: TripTransaction::commit
#[async_trait]
pub trait TripTransaction: Send {
    async fn insert_trip(&mut self, trip: &NewTrip) -> AppResult<i32>;

    async fn attach_flight(&mut self, trip_id: i32, flight_id: i32, order: i32) -> AppResult<()>;

    async fn commit(&mut self) -> AppResult<()>;

    async fn rollback(&mut self) -> AppResult<()>;
}
