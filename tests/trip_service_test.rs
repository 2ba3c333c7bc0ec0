use async_trait::async_trait;
use chrono::Duration;
use flighthub::config::{PaginationConfig, TripPolicy};
use flighthub::models::trip::{TripListParams, TripPayload, TripType};
use flighthub::repository::memory::InMemoryStore;
use flighthub::services::trip_service::TripService;
use flighthub::utils::error::AppError;
use flighthub::utils::request_time::RequestTime;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use test_context::{test_context, AsyncTestContext};

mod common {
    pub mod test_utils;
}
use common::test_utils::{memory_store, today, FailingTripStore};

struct TripServiceContext {
    store: InMemoryStore,
    trip_service: TripService,
}

#[async_trait]
impl AsyncTestContext for TripServiceContext {
    async fn setup() -> Self {
        let store = memory_store();
        let trip_service = TripService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            TripPolicy::default(),
            PaginationConfig::default(),
        );

        TripServiceContext {
            store,
            trip_service,
        }
    }
}

fn payload(trip_type: &str, flights: &[i32], departure_in: i64, return_in: Option<i64>) -> TripPayload {
    TripPayload {
        trip_type: Some(trip_type.to_string()),
        flights: Some(json!(flights)),
        departure_date: Some((today() + Duration::days(departure_in)).to_string()),
        return_date: return_in.map(|days| (today() + Duration::days(days)).to_string()),
    }
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_validate_round_trip_prices_both_flights(ctx: &TripServiceContext) -> Result<(), AppError> {
    let validation = ctx
        .trip_service
        .validate(payload("round-trip", &[10, 11], 1, Some(6)), &RequestTime::now())
        .await?;

    assert!(validation.is_valid(), "{:?}", validation.messages());
    assert_eq!(validation.total_price, Decimal::new(46050, 2));
    assert_eq!(ctx.store.trip_count().await, 0);

    Ok(())
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_validate_one_way_with_two_flights(ctx: &TripServiceContext) -> Result<(), AppError> {
    let validation = ctx
        .trip_service
        .validate(payload("one-way", &[10, 11], 1, None), &RequestTime::now())
        .await?;

    assert!(!validation.is_valid());
    assert_eq!(
        validation.messages(),
        vec!["One-way trips must have exactly one flight"]
    );

    Ok(())
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_validate_reports_unknown_flights(ctx: &TripServiceContext) -> Result<(), AppError> {
    let validation = ctx
        .trip_service
        .validate(payload("one-way", &[404], 1, None), &RequestTime::now())
        .await?;

    assert_eq!(validation.messages(), vec!["Some flights do not exist"]);
    assert_eq!(validation.total_price, Decimal::ZERO);

    Ok(())
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_malformed_payload_is_a_field_error(ctx: &TripServiceContext) {
    let mut request = payload("one-way", &[10], 1, None);
    request.flights = None;

    match ctx.trip_service.validate(request, &RequestTime::now()).await {
        Err(AppError::ValidationError(errors)) => {
            assert_eq!(errors["flights"], vec!["The flights field is required."]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_create_multi_city_trip_keeps_flight_order(ctx: &TripServiceContext) -> Result<(), AppError> {
    let trip = ctx
        .trip_service
        .create_trip(payload("multi-city", &[12, 13, 11], 2, None), &RequestTime::now())
        .await?;

    assert_eq!(trip.trip_type, TripType::MultiCity);
    assert_eq!(
        trip.flights.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![12, 13, 11]
    );
    // 99.99 + 210.00 + 340.50
    assert_eq!(trip.total_price, Decimal::new(65049, 2));

    let stored = ctx.trip_service.get_trip(trip.id).await?;
    assert_eq!(stored, trip);

    let listed = ctx
        .trip_service
        .list_trips(TripListParams::default(), &RequestTime::now().rule_context())
        .await?;
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].id, trip.id);

    Ok(())
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_create_rejects_rule_violations_without_writing(ctx: &TripServiceContext) {
    let result = ctx
        .trip_service
        .create_trip(payload("round-trip", &[11, 10], 1, Some(6)), &RequestTime::now())
        .await;

    match result {
        Err(AppError::TripInvalid(errors)) => {
            assert_eq!(errors, vec!["Return flight must depart after the outbound flight"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(ctx.store.trip_count().await, 0);
}

#[test_context(TripServiceContext)]
#[tokio::test]
async fn test_get_unknown_trip_is_not_found(ctx: &TripServiceContext) {
    assert!(matches!(
        ctx.trip_service.get_trip(12345).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_attachment_rolls_back_the_trip() {
    let store = memory_store();
    let trip_service = TripService::new(
        Arc::new(store.clone()),
        Arc::new(FailingTripStore {
            inner: store.clone(),
            fail_at: 1,
        }),
        TripPolicy::default(),
        PaginationConfig::default(),
    );

    let result = trip_service
        .create_trip(payload("round-trip", &[10, 11], 1, Some(6)), &RequestTime::now())
        .await;

    match result {
        Err(err @ AppError::Persistence(_)) => {
            assert_eq!(err.to_string(), "Failed to create trip: simulated attach failure");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // The first trip id handed out by the store is 1
    assert!(trip_service.get_trip(1).await.is_err());
    assert_eq!(store.trip_count().await, 0);
}

#[tokio::test]
async fn test_multi_city_minimum_can_be_disabled() {
    let store = memory_store();
    let relaxed = TripService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        TripPolicy {
            min_multi_city_flights: 0,
            ..TripPolicy::default()
        },
        PaginationConfig::default(),
    );

    let trip = relaxed
        .create_trip(payload("multi-city", &[10], 1, None), &RequestTime::now())
        .await
        .expect("single-leg multi-city trip should be accepted");
    assert_eq!(trip.flights.len(), 1);
}
