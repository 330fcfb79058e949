use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    http::header::SET_COOKIE,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::NonceResponse;

use crate::{
    nonce::{generate_nonce, NonceCookieSigner, NonceStore},
    types::{AppError, Environment},
};

/// Issued nonce together with the cookie binding it to the caller
pub struct NonceIssued {
    cookie: HeaderValue,
    body: NonceResponse,
}

impl IntoResponse for NonceIssued {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], Json(self.body)).into_response()
    }
}

impl OperationOutput for NonceIssued {
    type Inner = NonceResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<NonceResponse>::operation_response(ctx, operation)
    }
}

/// Issues a single-use nonce for Sign-In with Ethereum.
///
/// The nonce is recorded in the nonce store and returned in the body. The
/// same nonce is stored in a signed `siwe` cookie, replacing any previous one.
///
/// # Errors
///
/// - `NonceStoreError` - The nonce could not be recorded
pub async fn handler(
    Extension(environment): Extension<Environment>,
    Extension(nonce_store): Extension<Arc<dyn NonceStore>>,
    Extension(cookie_signer): Extension<NonceCookieSigner>,
) -> Result<NonceIssued, AppError> {
    let nonce = generate_nonce();
    let ttl = environment.nonce_ttl();

    nonce_store.issue(&nonce, ttl).await?;
    tracing::debug!("Issued nonce with ttl {}s", ttl.as_secs());

    Ok(NonceIssued {
        cookie: cookie_signer.set_cookie(&nonce, ttl),
        body: NonceResponse { nonce },
    })
}
