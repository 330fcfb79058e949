//! Wire types shared between the backend routes and the session client.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Response of `GET /v1/nonce`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NonceResponse {
    /// Single-use alphanumeric nonce to embed in the SIWE message
    pub nonce: String,
}

/// Successful wallet-auth payload produced by the host wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct WalletAuthPayload {
    /// Always `success` for a payload the wallet signed
    pub status: String,
    /// EIP-4361 message that was signed
    #[validate(length(min = 1, message = "invalid_payload"))]
    pub message: String,
    /// 65-byte hex signature over `message`
    #[validate(length(min = 130, max = 132, message = "invalid_signature_format"))]
    pub signature: String,
    /// Wallet address claimed by the host
    #[validate(length(equal = 42, message = "invalid_address"))]
    pub address: String,
    /// Payload format version
    pub version: u32,
}

/// Body of `POST /v1/complete-siwe`
///
/// The nonce itself is not format-checked here: any mismatch is answered
/// by the route as an invalid nonce.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CompleteSiweRequest {
    #[validate(nested)]
    pub payload: WalletAuthPayload,
    /// The nonce the client fetched before signing
    pub nonce: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Response of `POST /v1/complete-siwe`, both for accepted and rejected payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSiweResponse {
    pub status: ResponseStatus,
    pub is_valid: bool,
    /// Verified wallet address, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Rejection reason, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CompleteSiweResponse {
    #[must_use]
    pub const fn success(address: String) -> Self {
        Self {
            status: ResponseStatus::Success,
            is_valid: true,
            address: Some(address),
            message: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            is_valid: false,
            address: None,
            message: Some(message.into()),
        }
    }
}

/// World ID verification level requested from the host
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationLevel {
    /// Verified at an Orb, the strongest level
    #[default]
    Orb,
    /// Verified on device
    Device,
}

/// World ID proof as returned by the host after a successful `verify` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorldIdProof {
    /// Packed Groth16 proof, 0x-prefixed hex of eight 32-byte words
    pub proof: String,
    pub merkle_root: String,
    pub nullifier_hash: String,
    pub verification_level: VerificationLevel,
}

/// Body of `POST /v1/verify`
///
/// Fields are optional so the route can answer missing input with its own
/// error shape instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VerifyRequest {
    pub payload: Option<WorldIdProof>,
    /// Action identifier registered in the developer portal
    pub action: Option<String>,
    /// Application data the proof is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

/// Result reported by the World ID cloud verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CloudVerifyResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// Response of `POST /v1/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_res: Option<CloudVerifyResult>,
    /// Mirrors the HTTP status code
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    /// Whether the verifier accepted the proof
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status == 200 && self.verify_res.as_ref().is_some_and(|res| res.success)
    }
}
