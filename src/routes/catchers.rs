use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{json, Json, Value};
use rocket::Request;

fn error_body(status: Status, message: String) -> status::Custom<Json<Value>> {
    status::Custom(
        status,
        Json(json!({
            "success": false,
            "message": message,
        })),
    )
}

#[catch(400)]
pub fn bad_request(_req: &Request) -> status::Custom<Json<Value>> {
    error_body(Status::BadRequest, "Malformed request".to_string())
}

#[catch(404)]
pub fn not_found(req: &Request) -> status::Custom<Json<Value>> {
    error_body(Status::NotFound, format!("No route for {} {}", req.method(), req.uri()))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> status::Custom<Json<Value>> {
    error_body(
        Status::UnprocessableEntity,
        "Request body could not be understood".to_string(),
    )
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> status::Custom<Json<Value>> {
    error_body(Status::InternalServerError, "Internal server error".to_string())
}
