//! Error handling for the stock ledger backend
//!
//! Every failure surfaces as a JSON body `{"error": {"code", "message", "field"}}`
//! with a status code matching its class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid input")]
    InvalidInput(#[from] validator::ValidationErrors),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business rule errors
    #[error("Insufficient stock for {target}: requested {requested}, available {available}")]
    InsufficientStock {
        target: String,
        requested: i64,
        available: i64,
    },

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field-level validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Unique and foreign key violations on a write are caller errors, not
    /// database failures
    pub fn from_write_error(err: sqlx::Error, unique_field: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry(unique_field.to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::validation(
                db.constraint().unwrap_or("reference"),
                "Referenced record does not exist",
            ),
            _ => AppError::DatabaseError(err),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::InvalidInput(errors) => {
                let details: serde_json::Map<String, serde_json::Value> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, field_errors)| {
                        let messages: Vec<serde_json::Value> = field_errors
                            .iter()
                            .map(|e| {
                                let msg = e
                                    .message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string());
                                serde_json::Value::String(msg)
                            })
                            .collect();
                        (field.to_string(), serde_json::Value::Array(messages))
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail {
                        details: Some(serde_json::Value::Object(details)),
                        ..ErrorDetail::new("VALIDATION_ERROR", "One or more fields are invalid")
                    },
                )
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                requested,
                available,
                ..
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    details: Some(serde_json::json!({
                        "requested": requested,
                        "available": available,
                    })),
                    ..ErrorDetail::new("INSUFFICIENT_STOCK", self.to_string())
                },
            ),
            AppError::ConcurrentModification(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "CONCURRENT_MODIFICATION",
                    format!("Stock changed while the request was applied, please retry: {}", msg),
                ),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new(
                        "DUPLICATE_ENTRY",
                        format!("A record with this {} already exists", field),
                    )
                },
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorDetail::new("CONFLICT", msg.clone())),
            AppError::DatabaseError(sqlx::Error::PoolTimedOut) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("DATABASE_UNAVAILABLE", "The database is temporarily unavailable"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Lift a `shared` validation result into a field error
pub fn check(field: &str, result: Result<(), &'static str>) -> AppResult<()> {
    result.map_err(|message| AppError::validation(field, message))
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::validation("quantity", "Quantity must be positive"), StatusCode::BAD_REQUEST),
            (AppError::NotFound("Product".to_string()), StatusCode::NOT_FOUND),
            (
                AppError::InsufficientStock {
                    target: "prd_1".to_string(),
                    requested: 2,
                    available: 1,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::ConcurrentModification("prd_1".to_string()), StatusCode::CONFLICT),
            (AppError::DuplicateEntry("sku".to_string()), StatusCode::CONFLICT),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_check_lifts_message() {
        let err = check("price", Err("Price cannot be negative")).unwrap_err();
        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "price");
                assert_eq!(message, "Price cannot be negative");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
