use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::utils::response::error as error_response;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Session {0} is fully booked")]
    CapacityExceeded(Uuid),

    #[error("Package credit {0} has no sessions remaining")]
    CreditExhausted(Uuid),

    #[error("No eligible package: {0}")]
    NoEligiblePackage(String),

    #[error("Member {member_id} already holds a booking for session {session_id}")]
    AlreadyBooked { member_id: Uuid, session_id: Uuid },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded(_)
            | AppError::CreditExhausted(_)
            | AppError::NoEligiblePackage(_)
            | AppError::AlreadyBooked { .. }
            | AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            AppError::CreditExhausted(_) => "CREDIT_EXHAUSTED",
            AppError::NoEligiblePackage(_) => "NO_ELIGIBLE_PACKAGE",
            AppError::AlreadyBooked { .. } => "ALREADY_BOOKED",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    pub fn not_found(kind: &str, id: Uuid) -> Self {
        AppError::NotFound(format!("{} with id '{}' was not found", kind, id))
    }

    /// Business rule rejections are expected traffic; only server faults log at error level.
    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::ExternalServiceError(msg) => {
                error!(error = ?self, message = %msg, "External service error");
            }
            _ => {
                warn!(code = self.code(), message = %self, "Request rejected");
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::CapacityExceeded(session_id) => Some(json!({ "session_id": session_id })),
            AppError::CreditExhausted(credit_id) => Some(json!({ "credit_id": credit_id })),
            AppError::AlreadyBooked {
                member_id,
                session_id,
            } => Some(json!({ "member_id": member_id, "session_id": session_id })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::ExternalServiceError(_) => "An upstream service failed".to_string(),
            other => other.to_string(),
        };

        error_response(code, public_message, self.details(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_conflicts_map_to_409() {
        let id = Uuid::new_v4();
        for err in [
            AppError::CapacityExceeded(id),
            AppError::CreditExhausted(id),
            AppError::NoEligiblePackage("none".into()),
            AppError::InvalidState("cancelled".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
        assert_eq!(AppError::CapacityExceeded(id).code(), "CAPACITY_EXCEEDED");
    }

    #[test]
    fn database_errors_hide_details() {
        let response = AppError::DatabaseError(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_names_the_resource() {
        let id = Uuid::nil();
        let err = AppError::not_found("Session", id);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("Session with id"));
    }
}
