use crate::models::catalog::{Airline, Airport, AirportFilter};
use crate::models::flight::{Flight, FlightQuery, FlightRecord};
use crate::models::response::Page;
use crate::models::trip::{NewTrip, Trip, TripQuery};
use crate::repository::{CatalogRepository, FlightRepository, TripRepository, TripTransaction};
use crate::seed::Catalog;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store with the same semantics as the MySQL tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    next_trip_id: Arc<AtomicI32>,
}

#[derive(Debug, Default)]
struct Tables {
    airlines: Vec<Airline>,
    airports: Vec<Airport>,
    flights: Vec<FlightRecord>,
    trips: Vec<TripRow>,
    links: Vec<TripFlightLink>,
}

#[derive(Debug, Clone)]
struct TripRow {
    id: i32,
    trip: NewTrip,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TripFlightLink {
    trip_id: i32,
    flight_id: i32,
    order: i32,
}

impl InMemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        InMemoryStore {
            tables: Arc::new(RwLock::new(Tables {
                airlines: catalog.airlines,
                airports: catalog.airports,
                flights: catalog.flights,
                trips: Vec::new(),
                links: Vec::new(),
            })),
            next_trip_id: Arc::new(AtomicI32::new(0)),
        }
    }

    pub async fn trip_count(&self) -> usize {
        self.tables.read().await.trips.len()
    }
}

impl Tables {
    fn expand(&self, record: &FlightRecord) -> Option<Flight> {
        let airline = self.airlines.iter().find(|a| a.id == record.airline_id)?;
        let departure = self
            .airports
            .iter()
            .find(|a| a.id == record.departure_airport_id)?;
        let arrival = self
            .airports
            .iter()
            .find(|a| a.id == record.arrival_airport_id)?;

        Some(Flight {
            id: record.id,
            flight_number: record.flight_number.clone(),
            price: record.price,
            departure_time: record.departure_time,
            arrival_time: record.arrival_time,
            airline: airline.clone(),
            departure_airport: departure.clone(),
            arrival_airport: arrival.clone(),
        })
    }

    fn flight(&self, id: i32) -> Option<Flight> {
        self.flights
            .iter()
            .find(|record| record.id == id)
            .and_then(|record| self.expand(record))
    }

    fn trip(&self, row: &TripRow) -> Trip {
        let mut links: Vec<&TripFlightLink> = self
            .links
            .iter()
            .filter(|link| link.trip_id == row.id)
            .collect();
        links.sort_by_key(|link| link.order);

        Trip {
            id: row.id,
            trip_type: row.trip.trip_type,
            total_price: row.trip.total_price,
            departure_date: row.trip.departure_date,
            return_date: row.trip.return_date,
            flights: links
                .iter()
                .filter_map(|link| self.flight(link.flight_id))
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_airlines(&self) -> AppResult<Vec<Airline>> {
        let mut airlines = self.tables.read().await.airlines.clone();
        airlines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(airlines)
    }

    async fn find_airline(&self, id: i32) -> AppResult<Option<Airline>> {
        let tables = self.tables.read().await;
        Ok(tables.airlines.iter().find(|a| a.id == id).cloned())
    }

    async fn list_airports(&self, filter: &AirportFilter) -> AppResult<Vec<Airport>> {
        let tables = self.tables.read().await;
        Ok(tables
            .airports
            .iter()
            .filter(|airport| airport.matches_filter(filter))
            .cloned()
            .collect())
    }

    async fn search_airports(&self, text: &str) -> AppResult<Vec<Airport>> {
        let tables = self.tables.read().await;
        Ok(tables
            .airports
            .iter()
            .filter(|airport| airport.matches_text(text))
            .cloned()
            .collect())
    }

    async fn find_airport(&self, id: i32) -> AppResult<Option<Airport>> {
        let tables = self.tables.read().await;
        Ok(tables.airports.iter().find(|a| a.id == id).cloned())
    }
}

#[async_trait]
impl FlightRepository for InMemoryStore {
    async fn search_flights(&self, query: &FlightQuery) -> AppResult<Page<Flight>> {
        let tables = self.tables.read().await;
        let mut flights: Vec<Flight> = tables
            .flights
            .iter()
            .filter_map(|record| tables.expand(record))
            .filter(|flight| query.matches(flight))
            .collect();
        flights.sort_by(|a, b| {
            query
                .order
                .apply(query.sort.compare(a, b))
                .then(a.id.cmp(&b.id))
        });

        Ok(Page::paginate(flights, query.page, query.per_page))
    }

    async fn find_flight(&self, id: i32) -> AppResult<Option<Flight>> {
        Ok(self.tables.read().await.flight(id))
    }

    async fn find_flights(&self, ids: &[i32]) -> AppResult<Vec<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights
            .iter()
            .filter(|record| ids.contains(&record.id))
            .filter_map(|record| tables.expand(record))
            .collect())
    }
}

#[async_trait]
impl TripRepository for InMemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn TripTransaction>> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            trips: Vec::new(),
            links: Vec::new(),
            finished: false,
        }))
    }

    async fn find_trip(&self, id: i32) -> AppResult<Option<Trip>> {
        let tables = self.tables.read().await;
        Ok(tables
            .trips
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.trip(row)))
    }

    async fn list_trips(&self, query: &TripQuery) -> AppResult<Page<Trip>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<Trip> = tables.trips.iter().map(|row| tables.trip(row)).collect();
        trips.sort_by(|a, b| {
            query
                .order
                .apply(query.sort.compare(a, b))
                .then(a.id.cmp(&b.id))
        });

        Ok(Page::paginate(trips, query.page, query.per_page))
    }
}

/// Staged trip rows, applied under one write lock on commit.
struct MemoryTransaction {
    store: InMemoryStore,
    trips: Vec<TripRow>,
    links: Vec<TripFlightLink>,
    finished: bool,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> AppResult<()> {
        if self.finished {
            return Err(AppError::DatabaseError("transaction already finished".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TripTransaction for MemoryTransaction {
    async fn insert_trip(&mut self, trip: &NewTrip) -> AppResult<i32> {
        self.ensure_open()?;
        let id = self.store.next_trip_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now().naive_utc();
        self.trips.push(TripRow {
            id,
            trip: trip.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn attach_flight(&mut self, trip_id: i32, flight_id: i32, order: i32) -> AppResult<()> {
        self.ensure_open()?;
        if !self.trips.iter().any(|row| row.id == trip_id) {
            return Err(AppError::DatabaseError(format!("trip {} is not part of this transaction", trip_id)));
        }
        let flight_exists = {
            let tables = self.store.tables.read().await;
            tables.flights.iter().any(|record| record.id == flight_id)
        };
        if !flight_exists {
            return Err(AppError::DatabaseError(format!("flight {} does not exist", flight_id)));
        }
        if self
            .links
            .iter()
            .any(|link| link.trip_id == trip_id && link.flight_id == flight_id)
        {
            return Err(AppError::DatabaseError(format!(
                "flight {} is already attached to trip {}",
                flight_id, trip_id
            )));
        }

        self.links.push(TripFlightLink {
            trip_id,
            flight_id,
            order,
        });
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.ensure_open()?;
        let mut tables = self.store.tables.write().await;
        tables.trips.append(&mut self.trips);
        tables.links.append(&mut self.links);
        self.finished = true;
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.trips.clear();
        self.links.clear();
        self.finished = true;
        Ok(())
    }
}
