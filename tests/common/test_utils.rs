#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use dotenv::dotenv;
use flighthub::db;
use flighthub::models::catalog::{Airline, Airport};
use flighthub::models::flight::FlightRecord;
use flighthub::models::response::Page;
use flighthub::models::trip::{NewTrip, Trip, TripQuery};
use flighthub::repository::memory::InMemoryStore;
use flighthub::repository::{TripRepository, TripTransaction};
use flighthub::seed::Catalog;
use flighthub::utils::error::{AppError, AppResult};
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlPool as Pool;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::Error;
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// `days` after today at `hour`:00
pub fn departure(days: i64, hour: u32) -> NaiveDateTime {
    (today() + Duration::days(days))
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn airport(id: i32, name: &str, code: &str, city: &str, timezone: &str, city_code: &str) -> Airport {
    Airport {
        id,
        name: name.to_string(),
        iata_code: code.to_string(),
        city: city.to_string(),
        latitude: 45.0,
        longitude: -75.0,
        timezone: timezone.to_string(),
        city_code: Some(city_code.to_string()),
    }
}

fn flight(id: i32, airline_id: i32, from: i32, to: i32, price: Decimal, departure_time: NaiveDateTime) -> FlightRecord {
    FlightRecord {
        id,
        flight_number: format!("FL{}", id),
        airline_id,
        departure_airport_id: from,
        arrival_airport_id: to,
        price,
        departure_time,
        arrival_time: departure_time + Duration::hours(3),
    }
}

/// Small fixed catalog:
///
/// | id | route   | airline | departs          | price  |
/// |----|---------|---------|------------------|--------|
/// | 10 | YUL→YVR | AC      | today+1 09:00    | 120.00 |
/// | 11 | YVR→YUL | WS      | today+6 15:00    | 340.50 |
/// | 12 | YUL→YYZ | AC      | today+2 08:00    |  99.99 |
/// | 13 | YYZ→YVR | AC      | today+4 10:00    | 210.00 |
/// | 14 | YUL→YYZ | WS      | today+2 18:00    | 150.00 |
pub fn fixture_catalog() -> Catalog {
    Catalog {
        airlines: vec![
            Airline {
                id: 1,
                name: "Air Canada".to_string(),
                iata_code: "AC".to_string(),
            },
            Airline {
                id: 2,
                name: "WestJet".to_string(),
                iata_code: "WS".to_string(),
            },
        ],
        airports: vec![
            airport(1, "Montréal-Trudeau International Airport", "YUL", "Montreal", "America/Montreal", "YMQ"),
            airport(2, "Toronto Pearson International Airport", "YYZ", "Toronto", "America/Toronto", "YTO"),
            airport(3, "Vancouver International Airport", "YVR", "Vancouver", "America/Vancouver", "YVR"),
        ],
        flights: vec![
            flight(10, 1, 1, 3, Decimal::new(12000, 2), departure(1, 9)),
            flight(11, 2, 3, 1, Decimal::new(34050, 2), departure(6, 15)),
            flight(12, 1, 1, 2, Decimal::new(9999, 2), departure(2, 8)),
            flight(13, 1, 2, 3, Decimal::new(21000, 2), departure(4, 10)),
            flight(14, 2, 1, 2, Decimal::new(15000, 2), departure(2, 18)),
        ],
    }
}

pub fn memory_store() -> InMemoryStore {
    InMemoryStore::new(fixture_catalog())
}

/// Trip store whose transactions fail on the `fail_at`-th flight attachment.
pub struct FailingTripStore {
    pub inner: InMemoryStore,
    pub fail_at: usize,
}

#[async_trait]
impl TripRepository for FailingTripStore {
    async fn begin(&self) -> AppResult<Box<dyn TripTransaction>> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
            attached: 0,
            fail_at: self.fail_at,
        }))
    }

    async fn find_trip(&self, id: i32) -> AppResult<Option<Trip>> {
        self.inner.find_trip(id).await
    }

    async fn list_trips(&self, query: &TripQuery) -> AppResult<Page<Trip>> {
        self.inner.list_trips(query).await
    }
}

struct FailingTransaction {
    inner: Box<dyn TripTransaction>,
    attached: usize,
    fail_at: usize,
}

#[async_trait]
impl TripTransaction for FailingTransaction {
    async fn insert_trip(&mut self, trip: &NewTrip) -> AppResult<i32> {
        self.inner.insert_trip(trip).await
    }

    async fn attach_flight(&mut self, trip_id: i32, flight_id: i32, order: i32) -> AppResult<()> {
        if self.attached == self.fail_at {
            return Err(AppError::DatabaseError("simulated attach failure".into()));
        }
        self.attached += 1;
        self.inner.attach_flight(trip_id, flight_id, order).await
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> AppResult<()> {
        self.inner.rollback().await
    }
}

static TEST_DB: OnceCell<Mutex<Option<TestDb>>> = OnceCell::new();
static DB_NAME: OnceCell<String> = OnceCell::new();

#[derive(Debug)]
pub struct TestDb {
    pub pool: Pool,
    pub db_name: String,
}

// Server URL without a database path, from ADMIN_DATABASE_URL
fn admin_base_url() -> Option<String> {
    dotenv().ok();
    let db_url = env::var("ADMIN_DATABASE_URL").ok()?;
    Some(db_url.split('/').take(3).collect::<Vec<&str>>().join("/"))
}

async fn create_connection_pool(url: &str) -> Result<Pool, Error> {
    MySqlPoolOptions::new().max_connections(10).connect(url).await
}

impl TestDb {
    // Shared pool for every test in one run; None when no MySQL server is configured
    pub async fn get_instance() -> Option<Pool> {
        let base_url = admin_base_url()?;

        let test_db = TEST_DB.get_or_init(|| Mutex::new(None));
        let mut guard = test_db.lock().await;
        if let Some(db) = guard.as_ref() {
            return Some(db.pool.clone());
        }

        let db = Self::setup_database(&base_url)
            .await
            .expect("Failed to set up the test database");
        let pool = db.pool.clone();
        *guard = Some(db);
        Some(pool)
    }

    async fn setup_database(base_url: &str) -> Result<Self, Error> {
        // One database per test run, named by timestamp
        let db_name = DB_NAME
            .get_or_init(|| {
                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_secs();
                format!("flighthub_test_{}", timestamp)
            })
            .clone();

        let admin_pool = create_connection_pool(base_url).await?;
        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await?;

        let pool = create_connection_pool(&format!("{}/{}", base_url, db_name)).await?;
        db::migrate(&pool).await?;
        db::seed(&pool, &fixture_catalog()).await?;

        Ok(Self { pool, db_name })
    }

    // Drop the run's database; called from a dtor, so it brings its own runtime
    pub fn cleanup_database_sync() -> Result<(), Error> {
        let (Some(base_url), Some(db_name)) = (admin_base_url(), DB_NAME.get().cloned()) else {
            return Ok(());
        };

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(Error::Io)?;
            runtime.block_on(async {
                let admin_pool = create_connection_pool(&base_url).await?;
                sqlx::query(&format!("DROP DATABASE IF EXISTS {}", db_name))
                    .execute(&admin_pool)
                    .await?;
                Ok(())
            })
        })
        .join()
        .unwrap_or(Ok(()))
    }
}
