use async_trait::async_trait;
use common_types::{CloudVerifyResult, VerificationLevel, WorldIdProof};
use serde::{Deserialize, Serialize};
use worldchain::signature::hash_to_field_hex;

use super::{error::WorldIdError, request::Request};

/// Prefix every Developer Portal app id carries
const APP_ID_PREFIX: &str = "app_";

/// Body of the cloud verifier's `verify` endpoint
///
/// [Developer Portal API](https://docs.world.org/world-id/reference/api#verify-proof)
#[derive(Serialize)]
struct CloudVerificationRequest<'a> {
    nullifier_hash: &'a str,
    merkle_root: &'a str,
    proof: &'a str,
    verification_level: VerificationLevel,
    action: &'a str,
    signal_hash: String,
}

/// Error body returned with a `400` by the cloud verifier
#[derive(Debug, Deserialize)]
struct CloudErrorResponse {
    code: Option<String>,
    detail: Option<String>,
    attribute: Option<String>,
}

/// Checks the configured app id
///
/// # Errors
/// Returns `WorldIdError::InvalidAppId` if the id is missing or lacks the `app_` prefix
pub fn validate_app_id(app_id: Option<String>) -> Result<String, WorldIdError> {
    match app_id {
        Some(id) if id.starts_with(APP_ID_PREFIX) => Ok(id),
        Some(id) => Err(WorldIdError::InvalidAppId(id)),
        None => Err(WorldIdError::InvalidAppId("not configured".to_string())),
    }
}

/// Verifies a World ID proof for an action
#[async_trait]
pub trait WorldIdVerifier: Send + Sync {
    /// Returns the verifier's verdict. A rejected proof is `Ok` with
    /// `success == false`; only infrastructure failures are errors.
    ///
    /// # Errors
    /// Returns a `WorldIdError` when the verifier cannot be reached or answers unexpectedly
    async fn verify(
        &self,
        app_id: &str,
        proof: &WorldIdProof,
        action: &str,
        signal: Option<&str>,
    ) -> Result<CloudVerifyResult, WorldIdError>;
}

/// Client for the Developer Portal cloud verifier
pub struct CloudVerifier {
    base_url: String,
}

impl CloudVerifier {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, app_id: &str) -> String {
        format!("{}/api/v2/verify/{app_id}", self.base_url)
    }
}

#[async_trait]
impl WorldIdVerifier for CloudVerifier {
    async fn verify(
        &self,
        app_id: &str,
        proof: &WorldIdProof,
        action: &str,
        signal: Option<&str>,
    ) -> Result<CloudVerifyResult, WorldIdError> {
        let request = CloudVerificationRequest {
            nullifier_hash: &proof.nullifier_hash,
            merkle_root: &proof.merkle_root,
            proof: &proof.proof,
            verification_level: proof.verification_level,
            action,
            signal_hash: hash_to_field_hex(signal.unwrap_or_default().as_bytes()),
        };

        let response = Request::post(&self.endpoint(app_id), &request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(CloudVerifyResult {
                success: true,
                code: None,
                detail: None,
                attribute: None,
            });
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            let body: CloudErrorResponse = response
                .json()
                .await
                .map_err(|e| WorldIdError::InvalidVerifierResponse(e.to_string()))?;

            tracing::info!(
                code = body.code.as_deref().unwrap_or_default(),
                detail = body.detail.as_deref().unwrap_or_default(),
                "World ID proof rejected"
            );

            return Ok(CloudVerifyResult {
                success: false,
                code: body.code,
                detail: body.detail,
                attribute: body.attribute,
            });
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(WorldIdError::InvalidVerifierResponse(format!(
            "Status {status}: {error_text}"
        )))
    }
}
