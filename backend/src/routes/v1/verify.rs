use std::sync::Arc;

use aide::OperationOutput;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::{VerifyRequest, VerifyResponse};

use crate::{
    types::Environment,
    world_id::{verifier::validate_app_id, WorldIdVerifier},
};

const INTERNAL_ERROR: &str = "Internal server error during verification";
const MISSING_FIELDS: &str = "Missing required fields: payload and action";
const INVALID_BODY: &str = "Invalid request body";

/// Verification verdict; the HTTP status mirrors `status` in the body
pub struct VerifyOutcome(VerifyResponse);

impl VerifyOutcome {
    fn error(status: StatusCode, message: &str) -> Self {
        Self(VerifyResponse {
            verify_res: None,
            status: status.as_u16(),
            error: Some(message.to_string()),
        })
    }
}

impl IntoResponse for VerifyOutcome {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

impl OperationOutput for VerifyOutcome {
    type Inner = VerifyResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<VerifyResponse>::operation_response(ctx, operation)
    }
}

/// Verifies a World ID proof with the cloud verifier.
///
/// Answers `200` with the verifier result when the proof is accepted and
/// `400` with the verifier's `detail` as `error` when it is rejected.
/// Missing `payload` or `action`, or a body that does not parse, is a
/// `400`; a missing or malformed
/// `WORLD_APP_ID` and verifier outages are `500`.
pub async fn handler(
    Extension(environment): Extension<Environment>,
    Extension(world_id_verifier): Extension<Arc<dyn WorldIdVerifier>>,
    request: Result<Json<VerifyRequest>, JsonRejection>,
) -> VerifyOutcome {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Unreadable verify request: {rejection}");
            return VerifyOutcome::error(StatusCode::BAD_REQUEST, INVALID_BODY);
        }
    };

    let (Some(proof), Some(action)) = (
        request.payload.as_ref(),
        request.action.as_deref().filter(|action| !action.is_empty()),
    ) else {
        tracing::warn!("Verify request without payload or action");
        return VerifyOutcome::error(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };

    let app_id = match validate_app_id(environment.world_app_id()) {
        Ok(app_id) => app_id,
        Err(err) => {
            tracing::error!("World ID verification unavailable: {err}");
            return VerifyOutcome::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "World ID app id is not configured",
            );
        }
    };

    match world_id_verifier
        .verify(&app_id, proof, action, request.signal.as_deref())
        .await
    {
        Ok(result) if result.success => {
            tracing::info!(action, "World ID proof verified");
            VerifyOutcome(VerifyResponse {
                verify_res: Some(result),
                status: StatusCode::OK.as_u16(),
                error: None,
            })
        }
        Ok(result) => {
            let error = result
                .detail
                .clone()
                .unwrap_or_else(|| "Verification failed".to_string());
            VerifyOutcome(VerifyResponse {
                verify_res: Some(result),
                status: StatusCode::BAD_REQUEST.as_u16(),
                error: Some(error),
            })
        }
        Err(err) => {
            tracing::error!("World ID verifier error: {err}");
            VerifyOutcome::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}
