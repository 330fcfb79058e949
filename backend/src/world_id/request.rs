use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use super::error::WorldIdError;

/// Default timeout for World ID verifier requests
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Shared HTTP client with connection pooling for all verifier requests
static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
        .user_agent(format!("marriage-dao-backend/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Thin wrapper over the shared client
pub struct Request;

impl Request {
    /// Makes a POST request to the given URL with a JSON body.
    ///
    /// # Errors
    /// Returns an error if the request fails or timeout occurs
    pub async fn post<T>(url: &str, body: T) -> Result<reqwest::Response, WorldIdError>
    where
        T: Serialize + Send + Sync,
    {
        HTTP_CLIENT
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Into::into)
    }
}
