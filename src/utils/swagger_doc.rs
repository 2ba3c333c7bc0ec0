use crate::utils::error::AppError;
use crate::utils::rules::FieldErrors;
use okapi::openapi3::SchemaObject;
use rocket::http::Status;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RefOr;
use rocket_okapi::okapi::openapi3::{MediaType, Response, Responses};
use rocket_okapi::response::OpenApiResponderInner;

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();

        let mut field_errors = FieldErrors::new();
        field_errors.insert(
            "departure_airport".to_string(),
            vec!["The departure airport field is required.".to_string()],
        );

        // Define error responses
        let error_responses = [
            (Status::BadRequest, "Bad Request", AppError::BadRequest("Search query is required".to_string())),
            (Status::NotFound, "Not Found", AppError::NotFound("Flight not found".to_string())),
            (Status::UnprocessableEntity, "Invalid input or trip rules violated", AppError::ValidationError(field_errors)),
            (Status::InternalServerError, "Internal Server Error", AppError::Persistence("transaction rolled back".to_string())),
        ];

        for (status, description, error) in error_responses {
            responses.responses.insert(
                status.code.to_string(),
                RefOr::Object(Response {
                    description: description.to_string(),
                    content: [(
                        "application/json".to_string(),
                        MediaType {
                            schema: Some(SchemaObject::default()),
                            example: Some(error.body()),
                            ..Default::default()
                        },
                    )]
                    .into_iter()
                    .collect(),
                    ..Default::default()
                }),
            );
        }

        Ok(responses)
    }
}
