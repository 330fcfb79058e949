use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Extension, Router,
};
use backend::{
    nonce::{InMemoryNonceStore, NonceCookieSigner, NonceStore},
    routes,
    siwe::{SiweVerifier, WorldchainSiweVerifier},
    types::Environment,
    world_id::{CloudVerifier, WorldIdVerifier},
};
use mockito::ServerGuard;
use tower::ServiceExt;
use worldchain::rpc::JsonRpcClient;

/// Secret the test router signs nonce cookies with
pub const TEST_COOKIE_SECRET: &[u8] = b"marriage-dao-test-cookie-secret";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Base test setup with core dependencies
///
/// The mock server stands in for both the Worldchain RPC (`/rpc`) and the
/// World ID cloud verifier (`/api/v2/verify/{app_id}`).
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub nonce_store: Arc<InMemoryNonceStore>,
    pub cookie_signer: NonceCookieSigner,
    pub mock_server: ServerGuard,
}

impl TestSetup {
    pub async fn new(nonce_ttl_override: Option<u64>) -> Self {
        setup_test_env();

        let environment = Environment::Development { nonce_ttl_override };
        let mut mock_server = mockito::Server::new_async().await;

        // Contract wallet check: any address answers with a non-magic value
        mock_server
            .mock("POST", "/rpc")
            .with_status(200)
            .with_body(format!(
                r#"{{"jsonrpc":"2.0","id":1,"result":"0x{}"}}"#,
                "0".repeat(64)
            ))
            .create_async()
            .await;

        let nonce_store = Arc::new(InMemoryNonceStore::new());
        let cookie_signer = NonceCookieSigner::new(TEST_COOKIE_SECRET.to_vec());
        let siwe_verifier: Arc<dyn SiweVerifier> = Arc::new(WorldchainSiweVerifier::new(
            JsonRpcClient::new(format!("{}/rpc", mock_server.url())),
        ));
        let world_id_verifier: Arc<dyn WorldIdVerifier> =
            Arc::new(CloudVerifier::new(mock_server.url()));

        let router = routes::handler()
            .layer(Extension(environment.clone()))
            .layer(Extension(cookie_signer.clone()))
            .layer(Extension(nonce_store.clone() as Arc<dyn NonceStore>))
            .layer(Extension(siwe_verifier))
            .layer(Extension(world_id_verifier))
            .into();

        Self {
            router,
            environment,
            nonce_store,
            cookie_signer,
            mock_server,
        }
    }

    pub async fn default() -> Self {
        Self::new(None).await
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_post_request_with_cookie(route, payload, None)
            .await
    }

    pub async fn send_post_request_with_cookie(
        &self,
        route: &str,
        payload: serde_json::Value,
        cookie: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }

    /// Requests a nonce and returns it with the `name=value` cookie pair
    pub async fn issue_nonce(&self) -> (String, String) {
        let response = self
            .send_get_request("/v1/nonce")
            .await
            .expect("Failed to request nonce");
        let cookie = set_cookie_pair(&response).expect("Nonce response must set a cookie");
        let body = self
            .parse_response_body(response)
            .await
            .expect("Failed to parse nonce response");
        let nonce = body["nonce"].as_str().expect("nonce must be a string");

        (nonce.to_string(), cookie)
    }
}

/// `name=value` part of the response's `Set-Cookie` header
pub fn set_cookie_pair(response: &Response) -> Option<String> {
    let header = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    header.split(';').next().map(str::to_string)
}
