use std::time::Duration;

use async_trait::async_trait;
use common_types::{
    CompleteSiweRequest, CompleteSiweResponse, NonceResponse, VerifyRequest, VerifyResponse,
    WalletAuthPayload, WorldIdProof,
};
use reqwest::Client;

use crate::error::SessionError;

/// Default timeout for backend requests
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Marriage DAO backend endpoints used by the session flows
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /v1/nonce`
    async fn fetch_nonce(&self) -> Result<String, SessionError>;

    /// `POST /v1/complete-siwe`; a rejection is a response with `isValid: false`
    async fn complete_siwe(
        &self,
        payload: WalletAuthPayload,
        nonce: String,
    ) -> Result<CompleteSiweResponse, SessionError>;

    /// `POST /v1/verify`; a rejection is a response with a non-200 `status`
    async fn verify_proof(
        &self,
        proof: WorldIdProof,
        action: String,
        signal: Option<String>,
    ) -> Result<VerifyResponse, SessionError>;
}

/// HTTP client for the backend.
///
/// Keeps cookies between calls so the `siwe` nonce cookie set by
/// `/v1/nonce` reaches `/v1/complete-siwe`.
pub struct HttpBackendApi {
    base_url: String,
    http_client: Client,
}

impl HttpBackendApi {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .user_agent(format!("marriage-dao-session/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn fetch_nonce(&self) -> Result<String, SessionError> {
        let response = self.http_client.get(self.url("/v1/nonce")).send().await?;

        if !response.status().is_success() {
            return Err(SessionError::Transport(format!(
                "Failed to get nonce: status {}",
                response.status()
            )));
        }

        let body: NonceResponse = response.json().await?;
        Ok(body.nonce)
    }

    async fn complete_siwe(
        &self,
        payload: WalletAuthPayload,
        nonce: String,
    ) -> Result<CompleteSiweResponse, SessionError> {
        let response = self
            .http_client
            .post(self.url("/v1/complete-siwe"))
            .json(&CompleteSiweRequest { payload, nonce })
            .send()
            .await?;

        // 400 and 500 answers carry the same body shape
        let status = response.status();
        response.json().await.map_err(|e| {
            SessionError::Transport(format!("Unexpected complete-siwe response ({status}): {e}"))
        })
    }

    async fn verify_proof(
        &self,
        proof: WorldIdProof,
        action: String,
        signal: Option<String>,
    ) -> Result<VerifyResponse, SessionError> {
        let response = self
            .http_client
            .post(self.url("/v1/verify"))
            .json(&VerifyRequest {
                payload: Some(proof),
                action: Some(action),
                signal,
            })
            .send()
            .await?;

        let status = response.status();
        response.json().await.map_err(|e| {
            SessionError::Transport(format!("Unexpected verify response ({status}): {e}"))
        })
    }
}
