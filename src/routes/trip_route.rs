use crate::models::response::{ApiResponse, Page};
use crate::models::trip::{Trip, TripListParams, TripPayload, TripValidationResponse};
use crate::services::trip_service::TripService;
use crate::utils::error::AppError;
use crate::utils::request_time::RequestTime;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Check a flight selection against the trip rules and price it
#[openapi(tag = "Trips")]
#[post("/trips/validate", format = "json", data = "<payload>")]
pub async fn validate_trip(
    payload: Json<TripPayload>,
    time: RequestTime,
    trip_service: &State<TripService>,
) -> Result<Json<TripValidationResponse>, AppError> {
    let validation = trip_service.validate(payload.into_inner(), &time).await?;
    if !validation.is_valid() {
        return Err(AppError::TripInvalid(validation.messages()));
    }

    Ok(Json(TripValidationResponse {
        success: true,
        valid: true,
        message: "Trip is valid".to_string(),
        total_price: validation.total_price,
    }))
}

/// Book a trip
#[openapi(tag = "Trips")]
#[post("/trips", format = "json", data = "<payload>")]
pub async fn create_trip(
    payload: Json<TripPayload>,
    time: RequestTime,
    trip_service: &State<TripService>,
) -> Result<status::Created<Json<ApiResponse<Trip>>>, AppError> {
    let trip = trip_service.create_trip(payload.into_inner(), &time).await?;
    let location = format!("/api/trips/{}", trip.id);
    Ok(status::Created::new(location).body(Json(ApiResponse::ok(trip, "Trip created successfully"))))
}

/// List booked trips
#[openapi(tag = "Trips")]
#[get("/trips?<params..>")]
pub async fn list_trips(
    params: TripListParams,
    time: RequestTime,
    trip_service: &State<TripService>,
) -> Result<Json<ApiResponse<Page<Trip>>>, AppError> {
    let trips = trip_service.list_trips(params, &time.rule_context()).await?;
    Ok(Json(ApiResponse::ok(trips, "Trips retrieved successfully")))
}

/// Get one trip with its flights in itinerary order
#[openapi(tag = "Trips")]
#[get("/trips/<id>")]
pub async fn get_trip(
    id: i32,
    trip_service: &State<TripService>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let trip = trip_service.get_trip(id).await?;
    Ok(Json(ApiResponse::ok(trip, "Trip retrieved successfully")))
}
