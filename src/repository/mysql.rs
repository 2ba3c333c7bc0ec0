use crate::models::catalog::{Airline, Airport, AirportFilter};
use crate::models::flight::{Flight, FlightQuery, FlightSortField, SortOrder};
use crate::models::response::{offset, Page};
use crate::models::trip::{NewTrip, Trip, TripQuery, TripSortField};
use crate::repository::{CatalogRepository, FlightRepository, TripRepository, TripTransaction};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlPool;
use sqlx::{MySql, QueryBuilder, Transaction};
use std::collections::HashMap;

const FLIGHT_SELECT: &str = r#"
    SELECT
        f.id, f.flight_number, f.price, f.departure_time, f.arrival_time,
        al.id AS airline_id, al.name AS airline_name, al.iata_code AS airline_iata_code,
        da.id AS dep_id, da.name AS dep_name, da.iata_code AS dep_iata_code, da.city AS dep_city,
        da.latitude AS dep_latitude, da.longitude AS dep_longitude,
        da.timezone AS dep_timezone, da.city_code AS dep_city_code,
        aa.id AS arr_id, aa.name AS arr_name, aa.iata_code AS arr_iata_code, aa.city AS arr_city,
        aa.latitude AS arr_latitude, aa.longitude AS arr_longitude,
        aa.timezone AS arr_timezone, aa.city_code AS arr_city_code
"#;

const FLIGHT_JOINS: &str = r#"
    FROM flights f
    JOIN airlines al ON al.id = f.airline_id
    JOIN airports da ON da.id = f.departure_airport_id
    JOIN airports aa ON aa.id = f.arrival_airport_id
"#;

const AIRPORT_COLUMNS: &str =
    "SELECT id, name, iata_code, city, latitude, longitude, timezone, city_code FROM airports";

const TRIP_COLUMNS: &str = r#"
    SELECT t.id, t.trip_type, t.total_price, t.departure_date, t.return_date,
           t.created_at, t.updated_at
    FROM trips t
"#;

// One joined flight row with airline and airports flattened by prefix
#[derive(Debug, sqlx::FromRow)]
struct FlightRow {
    id: i32,
    flight_number: String,
    price: Decimal,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    airline_id: i32,
    airline_name: String,
    airline_iata_code: String,
    dep_id: i32,
    dep_name: String,
    dep_iata_code: String,
    dep_city: String,
    dep_latitude: f64,
    dep_longitude: f64,
    dep_timezone: String,
    dep_city_code: Option<String>,
    arr_id: i32,
    arr_name: String,
    arr_iata_code: String,
    arr_city: String,
    arr_latitude: f64,
    arr_longitude: f64,
    arr_timezone: String,
    arr_city_code: Option<String>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            flight_number: row.flight_number,
            price: row.price,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            airline: Airline {
                id: row.airline_id,
                name: row.airline_name,
                iata_code: row.airline_iata_code,
            },
            departure_airport: Airport {
                id: row.dep_id,
                name: row.dep_name,
                iata_code: row.dep_iata_code,
                city: row.dep_city,
                latitude: row.dep_latitude,
                longitude: row.dep_longitude,
                timezone: row.dep_timezone,
                city_code: row.dep_city_code,
            },
            arrival_airport: Airport {
                id: row.arr_id,
                name: row.arr_name,
                iata_code: row.arr_iata_code,
                city: row.arr_city,
                latitude: row.arr_latitude,
                longitude: row.arr_longitude,
                timezone: row.arr_timezone,
                city_code: row.arr_city_code,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TripFlightRow {
    trip_id: i32,
    #[sqlx(flatten)]
    flight: FlightRow,
}

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: i32,
    trip_type: String,
    total_price: Decimal,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TripRow {
    fn into_trip(self, flights: Vec<Flight>) -> AppResult<Trip> {
        let trip_type = self
            .trip_type
            .parse()
            .map_err(|_| AppError::DatabaseError(format!("Unknown trip type: {}", self.trip_type)))?;
        Ok(Trip {
            id: self.id,
            trip_type,
            total_price: self.total_price,
            departure_date: self.departure_date,
            return_date: self.return_date,
            flights,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn flight_sort_column(field: FlightSortField) -> &'static str {
    match field {
        FlightSortField::DepartureTime => "f.departure_time",
        FlightSortField::ArrivalTime => "f.arrival_time",
        FlightSortField::Price => "f.price",
        FlightSortField::FlightNumber => "f.flight_number",
    }
}

fn trip_sort_column(field: TripSortField) -> &'static str {
    match field {
        TripSortField::CreatedAt => "t.created_at",
        TripSortField::DepartureDate => "t.departure_date",
        TripSortField::TotalPrice => "t.total_price",
        TripSortField::TripType => "t.trip_type",
    }
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn push_flight_filters(builder: &mut QueryBuilder<'_, MySql>, query: &FlightQuery) {
    builder.push(" WHERE 1 = 1");
    if let Some(code) = &query.departure_airport {
        builder.push(" AND da.iata_code = ").push_bind(code.clone());
    }
    if let Some(code) = &query.arrival_airport {
        builder.push(" AND aa.iata_code = ").push_bind(code.clone());
    }
    if let Some(date) = query.date {
        builder.push(" AND DATE(f.departure_time) = ").push_bind(date);
    }
    if let Some(code) = &query.airline {
        builder.push(" AND al.iata_code = ").push_bind(code.clone());
    }
}

/// MySQL-backed store.
#[derive(Debug, Clone)]
pub struct MysqlStore {
    pool: MySqlPool,
}

impl MysqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        MysqlStore { pool }
    }

    // Flights of the given trips, grouped by trip id in itinerary order
    async fn trip_flights(&self, trip_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Flight>>> {
        let mut grouped: HashMap<i32, Vec<Flight>> = HashMap::new();
        if trip_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<MySql>::new(FLIGHT_SELECT);
        builder.push(", ft.trip_id");
        builder.push(FLIGHT_JOINS);
        builder.push(" JOIN flight_trip ft ON ft.flight_id = f.id WHERE ft.trip_id IN (");
        let mut ids = builder.separated(", ");
        for id in trip_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY ft.trip_id, ft.`order`");

        let rows: Vec<TripFlightRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        for row in rows {
            grouped.entry(row.trip_id).or_default().push(row.flight.into());
        }
        Ok(grouped)
    }
}

#[async_trait]
impl CatalogRepository for MysqlStore {
    async fn list_airlines(&self) -> AppResult<Vec<Airline>> {
        let airlines = sqlx::query_as::<_, Airline>(
            "SELECT id, name, iata_code FROM airlines ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(airlines)
    }

    async fn find_airline(&self, id: i32) -> AppResult<Option<Airline>> {
        let airline = sqlx::query_as::<_, Airline>(
            "SELECT id, name, iata_code FROM airlines WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(airline)
    }

    async fn list_airports(&self, filter: &AirportFilter) -> AppResult<Vec<Airport>> {
        let mut builder = QueryBuilder::<MySql>::new(AIRPORT_COLUMNS);
        builder.push(" WHERE 1 = 1");
        if let Some(city) = &filter.city {
            builder
                .push(" AND city LIKE ")
                .push_bind(format!("%{}%", city));
        }
        if let Some(code) = &filter.city_code {
            builder.push(" AND city_code = ").push_bind(code.clone());
        }
        builder.push(" ORDER BY id");

        let airports: Vec<Airport> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(airports)
    }

    async fn search_airports(&self, text: &str) -> AppResult<Vec<Airport>> {
        let pattern = format!("%{}%", text);
        let mut builder = QueryBuilder::<MySql>::new(AIRPORT_COLUMNS);
        builder
            .push(" WHERE name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR iata_code LIKE ")
            .push_bind(pattern.clone())
            .push(" OR city LIKE ")
            .push_bind(pattern)
            .push(" ORDER BY id");

        let airports: Vec<Airport> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(airports)
    }

    async fn find_airport(&self, id: i32) -> AppResult<Option<Airport>> {
        let airport = sqlx::query_as::<_, Airport>(&format!("{} WHERE id = ?", AIRPORT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(airport)
    }
}

#[async_trait]
impl FlightRepository for MysqlStore {
    async fn search_flights(&self, query: &FlightQuery) -> AppResult<Page<Flight>> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*)");
        count.push(FLIGHT_JOINS);
        push_flight_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut builder = QueryBuilder::<MySql>::new(FLIGHT_SELECT);
        builder.push(FLIGHT_JOINS);
        push_flight_filters(&mut builder, query);
        builder
            .push(format!(
                " ORDER BY {} {}, f.id ASC LIMIT ",
                flight_sort_column(query.sort),
                direction(query.order)
            ))
            .push_bind(query.per_page as i64)
            .push(" OFFSET ")
            .push_bind(offset(query.page, query.per_page) as i64);

        let rows: Vec<FlightRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(Page::new(
            rows.into_iter().map(Flight::from).collect(),
            total.max(0) as u64,
            query.page,
            query.per_page,
        ))
    }

    async fn find_flight(&self, id: i32) -> AppResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "{} {} WHERE f.id = ?",
            FLIGHT_SELECT, FLIGHT_JOINS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Flight::from))
    }

    async fn find_flights(&self, ids: &[i32]) -> AppResult<Vec<Flight>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<MySql>::new(FLIGHT_SELECT);
        builder.push(FLIGHT_JOINS);
        builder.push(" WHERE f.id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<FlightRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Flight::from).collect())
    }
}

#[async_trait]
impl TripRepository for MysqlStore {
    async fn begin(&self) -> AppResult<Box<dyn TripTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MysqlTransaction { tx: Some(tx) }))
    }

    async fn find_trip(&self, id: i32) -> AppResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(&format!("{} WHERE t.id = ?", TRIP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let mut flights = self.trip_flights(&[row.id]).await?;
                let flights = flights.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_trip(flights)?))
            }
            None => Ok(None),
        }
    }

    async fn list_trips(&self, query: &TripQuery) -> AppResult<Page<Trip>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<MySql>::new(TRIP_COLUMNS);
        builder
            .push(format!(
                " ORDER BY {} {}, t.id ASC LIMIT ",
                trip_sort_column(query.sort),
                direction(query.order)
            ))
            .push_bind(query.per_page as i64)
            .push(" OFFSET ")
            .push_bind(offset(query.page, query.per_page) as i64);
        let rows: Vec<TripRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let mut flights = self.trip_flights(&ids).await?;
        let trips = rows
            .into_iter()
            .map(|row| {
                let legs = flights.remove(&row.id).unwrap_or_default();
                row.into_trip(legs)
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(trips, total.max(0) as u64, query.page, query.per_page))
    }
}

/// A pooled MySQL transaction; dropped without commit it rolls back.
pub struct MysqlTransaction {
    tx: Option<Transaction<'static, MySql>>,
}

impl MysqlTransaction {
    fn open(&mut self) -> AppResult<&mut Transaction<'static, MySql>> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::DatabaseError("transaction already finished".into()))
    }
}

#[async_trait]
impl TripTransaction for MysqlTransaction {
    async fn insert_trip(&mut self, trip: &NewTrip) -> AppResult<i32> {
        let tx = self.open()?;
        let result = sqlx::query(
            r#"
            INSERT INTO trips (trip_type, total_price, departure_date, return_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, UTC_TIMESTAMP(), UTC_TIMESTAMP())
            "#,
        )
        .bind(trip.trip_type.to_string())
        .bind(trip.total_price)
        .bind(trip.departure_date)
        .bind(trip.return_date)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_id() as i32)
    }

    async fn attach_flight(&mut self, trip_id: i32, flight_id: i32, order: i32) -> AppResult<()> {
        let tx = self.open()?;
        sqlx::query(
            r#"
            INSERT INTO flight_trip (trip_id, flight_id, `order`, created_at, updated_at)
            VALUES (?, ?, ?, UTC_TIMESTAMP(), UTC_TIMESTAMP())
            "#,
        )
        .bind(trip_id)
        .bind(flight_id)
        .bind(order)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::DatabaseError("transaction already finished".into())),
        }
    }

    async fn rollback(&mut self) -> AppResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
