//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::nonce::NonceStoreError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// Maps a validator message code to a 400 error
    #[must_use]
    pub fn validation_from_str(field: &str, code: &str) -> Self {
        let (code, message) = match code {
            "invalid_payload" => ("invalid_payload", "Wallet auth payload is incomplete"),
            "invalid_signature_format" => (
                "invalid_signature_format",
                "Signature must be 65 bytes of hex",
            ),
            "invalid_address" => ("invalid_address", "Address must be 42 characters long"),
            _ => ("validation_error", "Request validation failed"),
        };

        if !field.is_empty() {
            tracing::debug!("Validation failed on field {field}: {code}");
        }

        Self::new(StatusCode::BAD_REQUEST, code, message, false)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message of the envelope
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.inner.error.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert nonce store errors to application errors
impl From<NonceStoreError> for AppError {
    fn from(err: NonceStoreError) -> Self {
        tracing::error!("Nonce store error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "nonce_store_error",
            "Failed to issue nonce",
            true,
        )
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
