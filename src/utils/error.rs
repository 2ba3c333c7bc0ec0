use crate::utils::rules::FieldErrors;
use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use serde_json::{json, Value};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error")]
    DatabaseError(String),

    #[error("Validation failed")]
    ValidationError(FieldErrors),

    #[error("Trip validation failed")]
    TripInvalid(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to create trip: {0}")]
    Persistence(String),

    #[error("Search failed for segment {}: {source}", .segment + 1)]
    SegmentSearch {
        segment: usize,
        source: Box<AppError>,
    },
}

// Convert sqlx::Error (database error) to AppError::DatabaseError
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::ValidationError(_) => Status::UnprocessableEntity,
            AppError::TripInvalid(_) => Status::UnprocessableEntity,
            AppError::NotFound(_) => Status::NotFound,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::DatabaseError(_) => Status::InternalServerError,
            AppError::Persistence(_) => Status::InternalServerError,
            AppError::SegmentSearch { source, .. } => source.status(),
        }
    }

    /// JSON body sent to the client for this error.
    pub fn body(&self) -> Value {
        match self {
            AppError::ValidationError(errors) => json!({
                "success": false,
                "message": self.to_string(),
                "errors": errors,
            }),
            AppError::TripInvalid(errors) => json!({
                "success": false,
                "valid": false,
                "message": self.to_string(),
                "errors": errors,
            }),
            AppError::SegmentSearch { segment, source } => {
                let mut body = source.body();
                body["message"] = json!(self.to_string());
                body["segment"] = json!(segment);
                body
            }
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        }
    }
}

// Format all error from route level to a Http Response at route level
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        match &self {
            AppError::DatabaseError(detail) | AppError::Persistence(detail) => {
                tracing::error!(uri = %request.uri(), %detail, "request failed");
            }
            _ => tracing::debug!(uri = %request.uri(), error = %self, "request rejected"),
        }

        let json = self.body();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_errors_take_the_inner_status() {
        let err = AppError::SegmentSearch {
            segment: 1,
            source: Box::new(AppError::DatabaseError("boom".into())),
        };
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.to_string(), "Search failed for segment 2: Database error");
        assert_eq!(err.body()["segment"], json!(1));
    }

    #[test]
    fn trip_rule_errors_report_a_flat_list() {
        let err = AppError::TripInvalid(vec!["One-way trips must have exactly one flight".into()]);
        let body = err.body();
        assert_eq!(err.status(), Status::UnprocessableEntity);
        assert_eq!(body["valid"], json!(false));
        assert_eq!(body["errors"][0], json!("One-way trips must have exactly one flight"));
    }
}
