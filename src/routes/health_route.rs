use crate::models::response::HealthResponse;
use crate::utils::request_time::RequestTime;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Liveness probe
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn health(time: RequestTime) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: time.instant().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "FlightHub API".to_string(),
    })
}
