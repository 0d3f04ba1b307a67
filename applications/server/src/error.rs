/// Server error types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vibesia_core::{FailureCode, VibesiaError};

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Errors raised by the domain and storage layers
    #[error(transparent)]
    Domain(#[from] VibesiaError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] vibesia_storage::StorageError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// HTTP status for a domain error
pub fn status_for(err: &VibesiaError) -> StatusCode {
    match err {
        VibesiaError::NotFound { .. } => StatusCode::NOT_FOUND,
        VibesiaError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        VibesiaError::Forbidden(_) => StatusCode::FORBIDDEN,
        VibesiaError::DuplicateEntry { .. } => StatusCode::CONFLICT,
        VibesiaError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VibesiaError::UnsupportedOperation(_) => StatusCode::NOT_IMPLEMENTED,
        VibesiaError::TransactionFailure { code, .. } => match code {
            FailureCode::ConstraintViolation => StatusCode::CONFLICT,
            FailureCode::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            FailureCode::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "code": code,
            "message": message,
        }
    }));
    (status, body).into_response()
}

fn unauthorized(message: String) -> Response {
    let mut response = error_response(StatusCode::UNAUTHORIZED, "unauthorized", message);
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Domain(err) => {
                let status = status_for(&err);
                match &err {
                    VibesiaError::TransactionFailure { source, .. } => {
                        tracing::error!(code = err.code(), source = ?source, "Storage failure: {}", err);
                    }
                    VibesiaError::Unauthorized(msg) => return unauthorized(msg.clone()),
                    _ => tracing::debug!(code = err.code(), "Request failed: {}", err),
                }

                let mut body = json!({
                    "error": {
                        "code": err.code(),
                        "message": err.to_string(),
                    }
                });
                if let VibesiaError::Validation(fields) = &err {
                    body["error"]["fields"] = json!(fields);
                }
                (status, Json(body)).into_response()
            }
            ServerError::Auth(msg) => unauthorized(msg),
            ServerError::BadRequest(msg) => {
                error_response(StatusCode::BAD_REQUEST, "bad_request", msg)
            }
            ServerError::Jwt(ref e) => {
                tracing::debug!("JWT error: {:?}", e);
                unauthorized("Invalid token".to_string())
            }
            ServerError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_failure",
                    "Storage error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Password error".to_string(),
                )
            }
        }
    }
}
