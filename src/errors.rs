// src/errors.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Auth errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid token")]
    InvalidToken,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // Business logic errors
    #[error("NIK not configured: {0}")]
    NotConfigured(String),

    #[error("Payroll already exists for this employee and month")]
    DuplicatePayrollPeriod,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::DuplicatePayrollPeriod => StatusCode::CONFLICT,
            AppError::Unauthorized(_) | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            AppError::NotConfigured(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidToken => "invalid_token",
            AppError::Validation(_) => "validation",
            AppError::InvalidAmount(_) => "invalid_amount",
            AppError::NotConfigured(_) => "not_configured",
            AppError::DuplicatePayrollPeriod => "duplicate_payroll_period",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        err.as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": {
                "code": status.as_u16(),
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;
