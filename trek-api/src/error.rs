use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use trek_booking::{BookingError, CredentialError};
use trek_core::StoreError;

use crate::token::TokenError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    AuthenticationError(String),
    AuthorizationError(String),
    NotFoundError(String),
    ConflictError(String),
    DependencyError(String),
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::NotFoundError(_) => StatusCode::NOT_FOUND,
            // Duplicate usernames answer 400, not 409
            AppError::ConflictError(_) => StatusCode::BAD_REQUEST,
            AppError::DependencyError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "An error occurred".to_string()
            }
            AppError::DependencyError(msg) => {
                tracing::warn!("Dependency failure: {}", msg);
                msg
            }
            AppError::ValidationError(msg)
            | AppError::AuthenticationError(msg)
            | AppError::AuthorizationError(msg)
            | AppError::NotFoundError(msg)
            | AppError::ConflictError(msg) => msg,
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::ValidationError("Invalid request body".to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => AppError::InternalServerError(msg),
            invalid @ TokenError::InvalidTtl(_) => AppError::InternalServerError(invalid.to_string()),
            other => AppError::AuthenticationError(other.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingFields => AppError::ValidationError(err.to_string()),
            CredentialError::UsernameTaken => AppError::ConflictError(err.to_string()),
            CredentialError::InvalidCredentials => AppError::AuthenticationError(err.to_string()),
            CredentialError::Hashing(_) | CredentialError::Store(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingTrip => AppError::ValidationError(err.to_string()),
            // A verified token for a user that is gone is as good as a bad token
            BookingError::UnknownUser(_) => AppError::AuthenticationError("Invalid token".to_string()),
            BookingError::IdentityMismatch { .. } => AppError::AuthorizationError(err.to_string()),
            BookingError::TripNotFound(_) => AppError::NotFoundError("trip not found".to_string()),
            BookingError::PaymentFailed => AppError::DependencyError(err.to_string()),
            BookingError::Persistence(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
