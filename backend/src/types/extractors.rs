//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header::COOKIE, request::Parts, StatusCode},
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::{nonce::NONCE_COOKIE_NAME, types::error::AppError};

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                    false,
                ),
                _ => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    "Invalid JSON payload",
                    false,
                ),
            })?;

        // Then validate
        payload.validate().map_err(|errors| {
            // Nested structs report their own field errors
            let flattened = errors.errors().iter().flat_map(|(field, kind)| match kind {
                validator::ValidationErrorsKind::Field(field_errors) => field_errors
                    .iter()
                    .map(|error| (field.to_string(), error.message.clone()))
                    .collect::<Vec<_>>(),
                validator::ValidationErrorsKind::Struct(nested) => nested
                    .field_errors()
                    .into_iter()
                    .flat_map(|(nested_field, field_errors)| {
                        field_errors
                            .iter()
                            .map(|error| (format!("{field}.{nested_field}"), error.message.clone()))
                            .collect::<Vec<_>>()
                    })
                    .collect(),
                validator::ValidationErrorsKind::List(_) => Vec::new(),
            });

            for (field, message) in flattened {
                // The message carries our error code
                if let Some(message) = message {
                    return AppError::validation_from_str(&field, message.as_ref());
                }
            }
            AppError::validation_from_str("", "validation_error")
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        // Same wire shape as Json<T>
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document validation error responses
        AppError::inferred_responses(ctx, operation)
    }
}

/// Raw value of the nonce cookie, if the request carries one.
///
/// The value is still signed; callers verify it with
/// [`NonceCookieSigner`](crate::nonce::NonceCookieSigner).
#[derive(Debug, Clone, Default, aide::OperationIo)]
pub struct NonceCookie(pub Option<String>);

impl<S> FromRequestParts<S> for NonceCookie
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == NONCE_COOKIE_NAME)
            .map(|(_, value)| value.to_string());

        Ok(Self(value))
    }
}
