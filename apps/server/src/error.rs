//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally POS                              │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │     │                                                                   │
//! │     ├── ValidationError / CoreError ──────────► 422                     │
//! │     ├── CoreError::ProductNotFound ───────────► 404 (422 at checkout)   │
//! │     ├── DbError::UniqueViolation ─────────────► 409                     │
//! │     ├── DbError::ForeignKeyViolation ─────────► 422                     │
//! │     ├── missing / bad token ──────────────────► 401                     │
//! │     ├── role lacks capability ────────────────► 403                     │
//! │     └── anything else ────────────────────────► 500 (detail logged)     │
//! │                                                                         │
//! │  Body: { "success": false, "code": "OUT_OF_STOCK", "message": "..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use tally_core::{CoreError, ValidationError};
use tally_db::{AdjustmentError, CheckoutError, DbError};

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Not enough units on hand
    OutOfStock,

    /// Amount tendered below the total
    InsufficientPayment,

    /// Duplicate unique value
    Conflict,

    /// Missing or invalid token
    Unauthenticated,

    /// Role lacks the capability
    Forbidden,

    /// Database or other internal failure
    Internal,
}

/// An error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{entity} not found: {id}"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden() -> Self {
        ApiError::new(
            StatusCode::FORBIDDEN,
            ErrorCode::Forbidden,
            "You do not have permission to perform this action",
        )
    }

    /// Logs `detail` and returns a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Internal error");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            "An internal error occurred",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                warn!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            other => ApiError::internal(other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::OutOfStock { .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::OutOfStock, message)
            }
            CoreError::InsufficientPayment { .. } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InsufficientPayment,
                message,
            ),
            CoreError::EmptyCart | CoreError::Validation(_) => ApiError::validation(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Checkout failures are all reported as unprocessable, unknown products
/// included.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(core) => {
                let mut api = ApiError::from(core);
                if api.status == StatusCode::NOT_FOUND {
                    api.status = StatusCode::UNPROCESSABLE_ENTITY;
                }
                api
            }
            CheckoutError::Db(db) => db.into(),
        }
    }
}

impl From<AdjustmentError> for ApiError {
    fn from(err: AdjustmentError) -> Self {
        match err {
            AdjustmentError::Core(core) => core.into(),
            AdjustmentError::Db(db) => db.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), ErrorCode::ValidationError, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tally_core::Money;

    #[test]
    fn test_core_error_statuses() {
        let out = ApiError::from(CoreError::OutOfStock {
            name: "Coke".to_string(),
            sku: "COKE-330".to_string(),
            available: 2,
            requested: 5,
        });
        assert_eq!(out.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(out.code, ErrorCode::OutOfStock);

        let missing = ApiError::from(CoreError::ProductNotFound("p1".to_string()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_checkout_not_found_is_unprocessable() {
        let err = ApiError::from(CheckoutError::Core(CoreError::ProductNotFound("p1".to_string())));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, ErrorCode::NotFound);

        let paid = ApiError::from(CheckoutError::Core(CoreError::InsufficientPayment {
            total: Money::from_cents(2997),
            paid: Money::from_cents(2000),
        }));
        assert_eq!(paid.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(paid.message, "Insufficient payment amount: total 29.97, paid 20.00");
    }

    #[test]
    fn test_db_error_statuses() {
        let dup = ApiError::from(DbError::duplicate("sku", "COKE-330"));
        assert_eq!(dup.status, StatusCode::CONFLICT);
        assert_eq!(dup.message, "sku 'COKE-330' already exists");

        let fk = ApiError::from(DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        });
        assert_eq!(fk.status, StatusCode::UNPROCESSABLE_ENTITY);

        let internal = ApiError::from(DbError::QueryFailed("disk I/O error".to_string()));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message.contains("disk"));
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = ApiError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "FORBIDDEN");
    }
}
