use std::collections::BTreeMap;
use std::error::Error;

use actix_web::{HttpResponse, ResponseError};
use mongodb::error::Error as MongoError;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    MongoError(#[from] MongoError)
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::BadRequest(message) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": message,
                    "code": 400
                }))
            },
            ApiError::NotFound(message) => {
                HttpResponse::NotFound().json(serde_json::json!({
                    "error": message,
                    "code": 404
                }))
            }
            ApiError::InternalServerError(message) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": message,
                    "code": 500
                }))
            },
            ApiError::InvalidData(message) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": message,
                    "code": 400
                }))
            },
            ApiError::Validation(errors) => {
                HttpResponse::BadRequest().json(field_error_map(errors))
            },
            ApiError::MongoError(message) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Database error: {}", message),
                    "code": 500,
                    "details": message.source().map(|src| src.to_string())
                }))
            }
        }
    }
}

/// Flattens validation errors into `{ field: [message, ...] }`.
///
/// Errors without an explicit message fall back to a readable text derived
/// from the rule code.
pub fn field_error_map(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs.iter().map(error_message).collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn error_message(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => "This field is required.".to_string(),
        "length" => "Ensure this field has a valid length.".to_string(),
        code => format!("Invalid value ({}).", code),
    }
}

/// Wraps a request-level failure (unparseable body, wrong content type)
/// so it renders with the same shape as field errors.
pub fn non_field_error(message: impl Into<String>) -> ApiError {
    let mut errors = ValidationErrors::new();
    let message: String = message.into();
    let mut error = ValidationError::new("parse");
    error.message = Some(message.into());
    errors.add(NON_FIELD_ERRORS, error);
    ApiError::Validation(errors)
}

// ----------------------------- TESTS --------------------------------
