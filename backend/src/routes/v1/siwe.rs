use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::{CompleteSiweRequest, CompleteSiweResponse};

use crate::{
    nonce::{NonceCookieSigner, NonceStore},
    siwe::{SiweError, SiweVerifier},
    types::{AppError, NonceCookie, ValidatedJson},
};

const INVALID_NONCE: &str = "Invalid nonce";
const INVALID_SIGNATURE: &str = "Invalid signature";
const INTERNAL_ERROR: &str = "Internal server error";

/// Outcome of a sign-in attempt
pub struct SiweOutcome {
    status: StatusCode,
    body: CompleteSiweResponse,
    clear_cookie: bool,
}

impl SiweOutcome {
    fn success(address: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: CompleteSiweResponse::success(address),
            clear_cookie: true,
        }
    }

    fn rejected(message: &str) -> Self {
        tracing::warn!("Sign-in rejected: {message}");
        Self {
            status: StatusCode::BAD_REQUEST,
            body: CompleteSiweResponse::error(message),
            clear_cookie: false,
        }
    }

    fn internal(err: &dyn std::error::Error) -> Self {
        tracing::error!("Sign-in failed: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: CompleteSiweResponse::error(INTERNAL_ERROR),
            clear_cookie: false,
        }
    }
}

impl IntoResponse for SiweOutcome {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if self.clear_cookie {
            response
                .headers_mut()
                .insert(SET_COOKIE, NonceCookieSigner::clear_cookie());
        }
        response
    }
}

impl OperationOutput for SiweOutcome {
    type Inner = CompleteSiweResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<CompleteSiweResponse>::operation_response(ctx, operation)
    }
}

/// Completes Sign-In with Ethereum for a World App wallet.
///
/// The submitted nonce must match the one in the caller's signed `siwe`
/// cookie and must still be live in the nonce store. It is consumed on
/// success, so a replay of the same payload is rejected.
///
/// Rejections answer `400` with `isValid: false` and either
/// `Invalid nonce` or `Invalid signature`. A body that fails validation is
/// rejected the same way, with the validation message.
pub async fn handler(
    Extension(nonce_store): Extension<Arc<dyn NonceStore>>,
    Extension(cookie_signer): Extension<NonceCookieSigner>,
    Extension(siwe_verifier): Extension<Arc<dyn SiweVerifier>>,
    NonceCookie(cookie): NonceCookie,
    request: Result<ValidatedJson<CompleteSiweRequest>, AppError>,
) -> SiweOutcome {
    let request = match request {
        Ok(ValidatedJson(request)) => request,
        Err(err) => return SiweOutcome::rejected(err.message()),
    };

    // 1. The nonce must be the one bound to this caller
    let cookie_nonce = cookie.as_deref().and_then(|value| cookie_signer.verify(value));
    if cookie_nonce.as_deref() != Some(request.nonce.as_str()) {
        return SiweOutcome::rejected(INVALID_NONCE);
    }

    // 2. It must not be expired or already used
    match nonce_store.is_live(&request.nonce).await {
        Ok(true) => {}
        Ok(false) => return SiweOutcome::rejected(INVALID_NONCE),
        Err(err) => return SiweOutcome::internal(&err),
    }

    // 3. The wallet must have signed a message carrying this nonce
    let address = match siwe_verifier.verify(&request.payload, &request.nonce).await {
        Ok(address) => address,
        Err(err) if err.is_transport() => return SiweOutcome::internal(&err),
        Err(SiweError::NonceMismatch) => return SiweOutcome::rejected(INVALID_NONCE),
        Err(err) => {
            tracing::debug!("SIWE verification failed: {err}");
            return SiweOutcome::rejected(INVALID_SIGNATURE);
        }
    };

    // 4. Take the nonce; a concurrent request may have won the race
    match nonce_store.consume(&request.nonce).await {
        Ok(true) => {}
        Ok(false) => return SiweOutcome::rejected(INVALID_NONCE),
        Err(err) => return SiweOutcome::internal(&err),
    }

    tracing::info!(%address, "Wallet authenticated");
    SiweOutcome::success(request.payload.address)
}
