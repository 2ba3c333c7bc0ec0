//! Runs against a real MySQL server when ADMIN_DATABASE_URL is set; otherwise
//! every test returns early.

use chrono::Duration;
use flighthub::models::flight::{FlightQuery, FlightSortField, SortOrder};
use flighthub::models::trip::{NewTrip, TripQuery, TripType};
use flighthub::repository::mysql::MysqlStore;
use flighthub::repository::{CatalogRepository, FlightRepository, TripRepository};
use rust_decimal::Decimal;

mod common {
    pub mod test_utils;
}
use common::test_utils::{today, TestDb};
use ctor::dtor;

#[dtor]
fn cleanup() {
    if let Err(e) = TestDb::cleanup_database_sync() {
        eprintln!("Failed to cleanup test database: {}", e);
    }
}

async fn store() -> Option<MysqlStore> {
    match TestDb::get_instance().await {
        Some(pool) => Some(MysqlStore::new(pool)),
        None => {
            eprintln!("ADMIN_DATABASE_URL not set, skipping MySQL test");
            None
        }
    }
}

fn query() -> FlightQuery {
    FlightQuery {
        page: 1,
        per_page: 10,
        ..Default::default()
    }
}

fn one_way(price: Decimal) -> NewTrip {
    NewTrip {
        trip_type: TripType::OneWay,
        total_price: price,
        departure_date: today() + Duration::days(4),
        return_date: None,
    }
}

#[tokio::test]
async fn test_search_flights_by_route_and_date() -> anyhow::Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let page = store
        .search_flights(&FlightQuery {
            departure_airport: Some("YUL".to_string()),
            arrival_airport: Some("YYZ".to_string()),
            date: Some(today() + Duration::days(2)),
            sort: FlightSortField::Price,
            order: SortOrder::Desc,
            ..query()
        })
        .await?;

    assert_eq!(page.total, 2);
    assert_eq!(page.items.iter().map(|f| f.id).collect::<Vec<_>>(), vec![14, 12]);
    assert_eq!(page.items[0].airline.iata_code, "WS");
    assert_eq!(page.items[1].price, Decimal::new(9999, 2));

    Ok(())
}

#[tokio::test]
async fn test_find_flights_skips_unknown_ids() -> anyhow::Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let mut flights = store.find_flights(&[13, 10, 404]).await?;
    flights.sort_by_key(|f| f.id);

    assert_eq!(flights.iter().map(|f| f.id).collect::<Vec<_>>(), vec![10, 13]);
    assert_eq!(flights[1].departure_airport.iata_code, "YYZ");
    assert_eq!(flights[1].arrival_airport.city, "Vancouver");
    assert!(store.find_flight(404).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_catalog_lookups() -> anyhow::Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    assert_eq!(store.list_airlines().await?.len(), 2);
    let found = store.search_airports("pearson").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].city_code.as_deref(), Some("YTO"));

    Ok(())
}

#[tokio::test]
async fn test_committed_trip_keeps_flight_order() -> anyhow::Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let mut tx = store.begin().await?;
    let trip_id = tx
        .insert_trip(&NewTrip {
            trip_type: TripType::MultiCity,
            ..one_way(Decimal::new(65049, 2))
        })
        .await?;
    tx.attach_flight(trip_id, 12, 1).await?;
    tx.attach_flight(trip_id, 13, 2).await?;
    tx.attach_flight(trip_id, 11, 3).await?;
    tx.commit().await?;

    let trip = store.find_trip(trip_id).await?.expect("committed trip");
    assert_eq!(trip.trip_type, TripType::MultiCity);
    assert_eq!(trip.total_price, Decimal::new(65049, 2));
    assert_eq!(trip.flights.iter().map(|f| f.id).collect::<Vec<_>>(), vec![12, 13, 11]);

    let listed = store.list_trips(&TripQuery::default()).await?;
    assert!(listed.items.iter().any(|t| t.id == trip_id));

    Ok(())
}

#[tokio::test]
async fn test_rolled_back_trip_is_not_stored() -> anyhow::Result<()> {
    let Some(store) = store().await else { return Ok(()) };

    let mut tx = store.begin().await?;
    let trip_id = tx.insert_trip(&one_way(Decimal::new(21000, 2))).await?;
    tx.attach_flight(trip_id, 13, 1).await?;
    // Same flight twice violates UNIQUE(trip_id, flight_id)
    assert!(tx.attach_flight(trip_id, 13, 2).await.is_err());
    tx.rollback().await?;

    assert!(store.find_trip(trip_id).await?.is_none());

    Ok(())
}
