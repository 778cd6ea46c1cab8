//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use blogger_core::error::{DomainError, FieldError};
use blogger_core::ports::AuthError;
use blogger_shared::{ApiResponse, ErrorResponse, FieldErrorBody};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldErrorBody>),

    /// Refused mutation; rendered as a normal page.
    #[error("Denied: {0}")]
    Denied(String),

    /// Session no longer maps to an account. Holds the login redirect.
    #[error("Login required")]
    LoginRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Denied(_) => StatusCode::OK,
            AppError::LoginRequired(_) => StatusCode::FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            AppError::Denied(message) => {
                return HttpResponse::Ok().json(ApiResponse::denied(message.clone()));
            }
            AppError::LoginRequired(location) => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, location.clone()))
                    .finish();
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

fn field_body(err: FieldError) -> FieldErrorBody {
    FieldErrorBody {
        field: err.field.to_string(),
        message: err.message,
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} {} not found", entity_type, key))
            }
            DomainError::Validation(errors) => {
                AppError::Validation(errors.into_iter().map(field_body).collect())
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            err @ DomainError::PermissionDenied => AppError::Denied(err.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<blogger_core::error::RepoError> for AppError {
    fn from(err: blogger_core::error::RepoError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Please enter a correct username and password.".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
