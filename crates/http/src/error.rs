//! Error handling for the Folio HTTP layer.
//!
//! `AppError` is the single boundary translator: every failure a handler can
//! produce maps onto the response envelope here, and nothing below this layer
//! writes HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::envelope::Envelope;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        errors: Vec<String>,
        message: String,
    },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error with one message per violated field rule
    pub fn validation(errors: Vec<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors,
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, message, errors) = match self {
            AppError::Validation { errors, message } => {
                (StatusCode::BAD_REQUEST, message, Some(errors))
            }
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message, None),
            AppError::Forbidden { message } => (StatusCode::FORBIDDEN, message, None),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                None,
            ),
        };

        tracing::error!(
            error_id = %error_id,
            status_code = %status.as_u16(),
            message = %message,
            "request error"
        );

        // In production, hide internal error details
        let message = if cfg!(not(debug_assertions)) && status == StatusCode::INTERNAL_SERVER_ERROR
        {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        (status, Json(Envelope::error(message, errors))).into_response()
    }
}
