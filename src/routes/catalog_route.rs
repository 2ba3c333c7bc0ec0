use crate::models::catalog::{Airline, Airport, AirportFilter};
use crate::models::response::ApiResponse;
use crate::services::catalog_service::CatalogService;
use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// List airlines
#[openapi(tag = "Airlines")]
#[get("/airlines")]
pub async fn list_airlines(
    catalog_service: &State<CatalogService>,
) -> Result<Json<ApiResponse<Vec<Airline>>>, AppError> {
    let airlines = catalog_service.list_airlines().await?;
    Ok(Json(ApiResponse::ok(airlines, "Airlines retrieved successfully")))
}

#[openapi(tag = "Airlines")]
#[get("/airlines/<id>")]
pub async fn get_airline(
    id: i32,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ApiResponse<Airline>>, AppError> {
    let airline = catalog_service.get_airline(id).await?;
    Ok(Json(ApiResponse::ok(airline, "Airline retrieved successfully")))
}

/// List airports, optionally by city or metropolitan code
#[openapi(tag = "Airports")]
#[get("/airports?<filter..>")]
pub async fn list_airports(
    filter: AirportFilter,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ApiResponse<Vec<Airport>>>, AppError> {
    let airports = catalog_service.list_airports(&filter).await?;
    Ok(Json(ApiResponse::ok(airports, "Airports retrieved successfully")))
}

/// Search airports by name, IATA code or city
#[openapi(tag = "Airports")]
#[get("/airports/search?<q>")]
pub async fn search_airports(
    q: Option<String>,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ApiResponse<Vec<Airport>>>, AppError> {
    let airports = catalog_service.search_airports(q.as_deref()).await?;
    Ok(Json(ApiResponse::ok(airports, "Airports retrieved successfully")))
}

#[openapi(tag = "Airports")]
#[get("/airports/<id>")]
pub async fn get_airport(
    id: i32,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ApiResponse<Airport>>, AppError> {
    let airport = catalog_service.get_airport(id).await?;
    Ok(Json(ApiResponse::ok(airport, "Airport retrieved successfully")))
}
