use crate::domain::validate::InvalidInput;
use crate::storage::StoreError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::header::ALLOW;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Methods served by every collection resource.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidInput> for ApiError {
    fn from(err: InvalidInput) -> Self {
        ApiError::InvalidInput(err.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::InvalidInput(format!("Invalid JSON body: {}", err.body_text()))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::Duplicate(msg) => ApiError::Duplicate(msg),
            StoreError::Timeout(_) => ApiError::Timeout(err.to_string()),
            // `{:#}` keeps the whole context chain (e.g. the underlying I/O message).
            StoreError::Backend(e) => ApiError::Backend(format!("{:#}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Backend(msg) | ApiError::Timeout(msg) => {
                tracing::error!(status = status.as_u16(), error = %msg, "store failure");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
            }
        }

        let mut response = (status, Json(ApiResponse::error(self.to_string()))).into_response();
        if let ApiError::MethodNotAllowed(_) = self {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}
