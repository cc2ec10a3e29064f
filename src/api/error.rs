use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::services::{AuthError, ItemError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    /// Field-level validation failure (422)
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Generic credential failure (422); identical for unknown email and
    /// wrong password
    InvalidCredentials,

    /// Missing or corrupt upload payload (400)
    InvalidUpload,

    Unauthenticated,

    Forbidden,

    DatabaseError(String),

    InternalError(String),
}

/// Error body shape: `{"message": ..., "errors": {field: [msg, ...]}}`,
/// with `errors` present only for validation-style failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Validation { message, .. } => write!(f, "Validation error: {}", message),
            ApiError::InvalidCredentials => write!(f, "email or password is incorrect."),
            ApiError::InvalidUpload => write!(f, "Invalid image upload."),
            ApiError::Unauthenticated => write!(f, "Unauthenticated"),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            ApiError::Validation { message, errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    message,
                    errors: Some(errors),
                },
            ),
            ApiError::InvalidCredentials => {
                let message = "email or password is incorrect.".to_string();
                let mut errors = BTreeMap::new();
                errors.insert("email".to_string(), vec![message.clone()]);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorBody {
                        message,
                        errors: Some(errors),
                    },
                )
            }
            ApiError::InvalidUpload => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Invalid image upload.".to_string(),
                    errors: None,
                },
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    message: "Unauthenticated.".to_string(),
                    errors: None,
                },
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    message: "This action is unauthorized.".to_string(),
                    errors: None,
                },
            ),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "A database error occurred".to_string(),
                        errors: None,
                    },
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "An internal error occurred".to_string(),
                        errors: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => ApiError::not_found("Item", id),
            ItemError::InvalidUpload => ApiError::InvalidUpload,
            ItemError::Database(msg) => ApiError::DatabaseError(msg),
            ItemError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(field: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![msg.clone()]);
        ApiError::Validation {
            message: msg,
            errors,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
