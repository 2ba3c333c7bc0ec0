use crate::config::{PaginationConfig, TripPolicy};
use crate::models::response::Page;
use crate::models::trip::{NewTrip, Trip, TripListParams, TripPayload, TripRequest};
use crate::repository::{FlightRepository, TripRepository, TripTransaction};
use crate::services::trip_validator::{validate_trip, TripValidation};
use crate::utils::error::{AppError, AppResult};
use crate::utils::request_time::RequestTime;
use crate::utils::rules::RuleContext;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct TripService {
    flights: Arc<dyn FlightRepository>,
    trips: Arc<dyn TripRepository>,
    policy: TripPolicy,
    pagination: PaginationConfig,
}

impl TripService {
    pub fn new(
        flights: Arc<dyn FlightRepository>,
        trips: Arc<dyn TripRepository>,
        policy: TripPolicy,
        pagination: PaginationConfig,
    ) -> Self {
        TripService {
            flights,
            trips,
            policy,
            pagination,
        }
    }

    // Check a selection without writing anything
    pub async fn validate(
        &self,
        payload: TripPayload,
        time: &RequestTime,
    ) -> AppResult<TripValidation> {
        let request = payload.into_request(&time.rule_context())?;
        self.evaluate(&request, time.instant()).await
    }

    pub async fn evaluate(
        &self,
        request: &TripRequest,
        requested_at: DateTime<Utc>,
    ) -> AppResult<TripValidation> {
        let flights = self.flights.find_flights(&request.flights).await?;
        Ok(validate_trip(request, &flights, requested_at, &self.policy))
    }

    // Validate, price and store a trip with its flights in one transaction
    pub async fn create_trip(&self, payload: TripPayload, time: &RequestTime) -> AppResult<Trip> {
        let request = payload.into_request(&time.rule_context())?;
        let validation = self.evaluate(&request, time.instant()).await?;
        if !validation.is_valid() {
            info!(errors = ?validation.messages(), "rejected trip");
            return Err(AppError::TripInvalid(validation.messages()));
        }

        let new_trip = NewTrip {
            trip_type: request.trip_type,
            total_price: validation.total_price,
            departure_date: request.departure_date,
            return_date: request.return_date,
        };

        let mut tx = self.trips.begin().await.map_err(persistence)?;
        let trip_id = match write_trip(tx.as_mut(), &new_trip, &request.flights).await {
            Ok(trip_id) => {
                tx.commit().await.map_err(persistence)?;
                trip_id
            }
            Err(err) => {
                warn!(error = %err, "trip write failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "rollback failed");
                }
                return Err(persistence(err));
            }
        };

        info!(
            trip_id,
            trip_type = %new_trip.trip_type,
            total_price = %new_trip.total_price,
            "trip created"
        );

        self.trips
            .find_trip(trip_id)
            .await?
            .ok_or_else(|| AppError::Persistence(format!("trip {} missing after commit", trip_id)))
    }

    pub async fn get_trip(&self, id: i32) -> AppResult<Trip> {
        self.trips
            .find_trip(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".into()))
    }

    pub async fn list_trips(&self, params: TripListParams, ctx: &RuleContext) -> AppResult<Page<Trip>> {
        let query = params.into_query(ctx, &self.pagination)?;
        self.trips.list_trips(&query).await
    }
}

async fn write_trip(
    tx: &mut dyn TripTransaction,
    trip: &NewTrip,
    flight_ids: &[i32],
) -> AppResult<i32> {
    let trip_id = tx.insert_trip(trip).await?;
    for (order, flight_id) in flight_ids.iter().enumerate() {
        tx.attach_flight(trip_id, *flight_id, order as i32).await?;
    }
    Ok(trip_id)
}

fn persistence(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(reason) => AppError::Persistence(reason),
        AppError::Persistence(reason) => AppError::Persistence(reason),
        other => AppError::Persistence(other.to_string()),
    }
}
