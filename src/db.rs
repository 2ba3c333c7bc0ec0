use crate::seed::Catalog;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder};
use std::time::Duration;

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS airlines (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        iata_code CHAR(2) NOT NULL UNIQUE,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS airports (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        iata_code CHAR(3) NOT NULL UNIQUE,
        city VARCHAR(255) NOT NULL,
        latitude DOUBLE NOT NULL,
        longitude DOUBLE NOT NULL,
        timezone VARCHAR(64) NOT NULL,
        city_code CHAR(3) NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_airports_city_code (city_code)
    )",
    "CREATE TABLE IF NOT EXISTS flights (
        id INT AUTO_INCREMENT PRIMARY KEY,
        flight_number VARCHAR(16) NOT NULL,
        airline_id INT NOT NULL,
        departure_airport_id INT NOT NULL,
        arrival_airport_id INT NOT NULL,
        price DECIMAL(10, 2) NOT NULL,
        departure_time DATETIME NOT NULL,
        arrival_time DATETIME NOT NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (airline_id) REFERENCES airlines(id),
        FOREIGN KEY (departure_airport_id) REFERENCES airports(id),
        FOREIGN KEY (arrival_airport_id) REFERENCES airports(id),
        INDEX idx_flights_route (departure_airport_id, arrival_airport_id, departure_time),
        CONSTRAINT chk_flights_price CHECK (price > 0),
        CONSTRAINT chk_flights_times CHECK (arrival_time > departure_time)
    )",
    "CREATE TABLE IF NOT EXISTS trips (
        id INT AUTO_INCREMENT PRIMARY KEY,
        trip_type VARCHAR(16) NOT NULL,
        total_price DECIMAL(10, 2) NOT NULL,
        departure_date DATE NOT NULL,
        return_date DATE NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS flight_trip (
        id INT AUTO_INCREMENT PRIMARY KEY,
        flight_id INT NOT NULL,
        trip_id INT NOT NULL,
        `order` INT NOT NULL,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (flight_id) REFERENCES flights(id),
        FOREIGN KEY (trip_id) REFERENCES trips(id) ON DELETE CASCADE,
        UNIQUE KEY uq_flight_trip (trip_id, flight_id)
    )",
];

// Create any missing tables
pub async fn migrate(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for &statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Load `catalog` into an empty database. Returns `false` when airlines
/// already exist and nothing was written.
pub async fn seed(pool: &MySqlPool, catalog: &Catalog) -> Result<bool, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM airlines")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    if !catalog.airlines.is_empty() {
        let mut airlines = QueryBuilder::<MySql>::new("INSERT INTO airlines (id, name, iata_code) ");
        airlines.push_values(&catalog.airlines, |mut row, airline| {
            row.push_bind(airline.id)
                .push_bind(airline.name.clone())
                .push_bind(airline.iata_code.clone());
        });
        airlines.build().execute(&mut *tx).await?;
    }

    if !catalog.airports.is_empty() {
        let mut airports = QueryBuilder::<MySql>::new(
            "INSERT INTO airports (id, name, iata_code, city, latitude, longitude, timezone, city_code) ",
        );
        airports.push_values(&catalog.airports, |mut row, airport| {
            row.push_bind(airport.id)
                .push_bind(airport.name.clone())
                .push_bind(airport.iata_code.clone())
                .push_bind(airport.city.clone())
                .push_bind(airport.latitude)
                .push_bind(airport.longitude)
                .push_bind(airport.timezone.clone())
                .push_bind(airport.city_code.clone());
        });
        airports.build().execute(&mut *tx).await?;
    }

    // Chunked to stay well below the placeholder limit
    for chunk in catalog.flights.chunks(500) {
        let mut flights = QueryBuilder::<MySql>::new(
            "INSERT INTO flights (id, flight_number, airline_id, departure_airport_id, \
             arrival_airport_id, price, departure_time, arrival_time) ",
        );
        flights.push_values(chunk, |mut row, flight| {
            row.push_bind(flight.id)
                .push_bind(flight.flight_number.clone())
                .push_bind(flight.airline_id)
                .push_bind(flight.departure_airport_id)
                .push_bind(flight.arrival_airport_id)
                .push_bind(flight.price)
                .push_bind(flight.departure_time)
                .push_bind(flight.arrival_time);
        });
        flights.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(true)
}
