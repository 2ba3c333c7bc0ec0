use crate::models::flight::{Flight, FlightListParams, FlightSearchParams};
use crate::models::response::{ApiResponse, Page};
use crate::models::search::{MultiCityResults, MultiCitySearchPayload};
use crate::services::flight_service::FlightService;
use crate::services::multi_city_service::MultiCityService;
use crate::utils::error::AppError;
use crate::utils::request_time::RequestTime;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Search flights for one route and departure date
#[openapi(tag = "Flights")]
#[get("/flights/search?<params..>")]
pub async fn search_flights(
    params: FlightSearchParams,
    time: RequestTime,
    flight_service: &State<FlightService>,
) -> Result<Json<ApiResponse<Page<Flight>>>, AppError> {
    let flights = flight_service
        .search_flights(params, &time.rule_context())
        .await?;
    Ok(Json(ApiResponse::ok(flights, "Flights retrieved successfully")))
}

/// Search every leg of a multi-city itinerary at once
#[openapi(tag = "Flights")]
#[post("/flights/search/multi-city", format = "json", data = "<payload>")]
pub async fn search_multi_city(
    payload: Json<MultiCitySearchPayload>,
    time: RequestTime,
    multi_city_service: &State<MultiCityService>,
) -> Result<Json<ApiResponse<MultiCityResults>>, AppError> {
    let results = multi_city_service
        .search(payload.into_inner(), &time.rule_context())
        .await?;
    Ok(Json(ApiResponse::ok(
        results,
        "Multi-city flights retrieved successfully",
    )))
}

/// List flights, optionally filtered
#[openapi(tag = "Flights")]
#[get("/flights?<params..>")]
pub async fn list_flights(
    params: FlightListParams,
    time: RequestTime,
    flight_service: &State<FlightService>,
) -> Result<Json<ApiResponse<Page<Flight>>>, AppError> {
    let flights = flight_service
        .list_flights(params, &time.rule_context())
        .await?;
    Ok(Json(ApiResponse::ok(flights, "Flights retrieved successfully")))
}

/// Get one flight with its airline and airports
#[openapi(tag = "Flights")]
#[get("/flights/<id>")]
pub async fn get_flight(
    id: i32,
    flight_service: &State<FlightService>,
) -> Result<Json<ApiResponse<Flight>>, AppError> {
    let flight = flight_service.get_flight(id).await?;
    Ok(Json(ApiResponse::ok(flight, "Flight retrieved successfully")))
}
