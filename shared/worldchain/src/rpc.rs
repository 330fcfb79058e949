//! JSON-RPC client for read-only contract calls

use std::time::Duration;

use alloy_primitives::Address;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{address::to_lower_hex, error::ChainError};

/// Default timeout for RPC requests
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Minimal `eth_call` client against a single RPC endpoint
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    url: String,
    http_client: Client,
}

impl JsonRpcClient {
    /// Creates a new client for `url`
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!("marriage-dao/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: url.into(),
            http_client,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Executes `eth_call` on the latest block and returns the raw return data
    ///
    /// # Errors
    /// - `ChainError::NetworkError` if the request fails
    /// - `ChainError::Rpc` if the node returns an error object (reverts included)
    /// - `ChainError::InvalidRpcResponse` if the result is missing or not hex
    pub async fn eth_call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": to_lower_hex(to),
                    "data": format!("0x{}", hex::encode(data)),
                },
                "latest"
            ],
        });

        tracing::debug!("eth_call to {} via {}", to_lower_hex(to), self.url);

        let response = self.http_client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChainError::InvalidRpcResponse(format!(
                "Status {status}: {error_text}"
            )));
        }

        let rpc_response: JsonRpcResponse = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = rpc_response
            .result
            .ok_or_else(|| ChainError::InvalidRpcResponse("Missing result".to_string()))?;

        hex::decode(result.strip_prefix("0x").unwrap_or(&result))
            .map_err(|e| ChainError::InvalidRpcResponse(format!("Result is not hex: {e}")))
    }
}
