use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::Extension;
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;

use crate::nonce::{NonceCookieSigner, NonceStore};
use crate::routes;
use crate::siwe::SiweVerifier;
use crate::types::Environment;
use crate::world_id::WorldIdVerifier;

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    nonce_store: Arc<dyn NonceStore>,
    siwe_verifier: Arc<dyn SiweVerifier>,
    world_id_verifier: Arc<dyn WorldIdVerifier>,
) -> anyhow::Result<()> {
    let mut openapi = OpenApi::default();
    let cookie_signer = NonceCookieSigner::new(environment.cookie_secret());

    let router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(cookie_signer))
        .layer(Extension(nonce_store))
        .layer(Extension(siwe_verifier))
        .layer(Extension(world_id_verifier))
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(
            std::time::Duration::from_secs(5),
        ));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Marriage DAO Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
