use std::sync::Arc;

use backend::{
    nonce::{InMemoryNonceStore, NonceStore, RedisClient, RedisNonceStore},
    server,
    siwe::{SiweVerifier, WorldchainSiweVerifier},
    types::Environment,
    world_id::{CloudVerifier, WorldIdVerifier},
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, EnvFilter};
use worldchain::rpc::JsonRpcClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Configure logging format based on environment
    // Use JSON format for staging/production (Datadog), regular format for development
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    info!("Starting Marriage DAO Backend in {:?} environment", environment);

    // Redis keeps nonces consistent across replicas; fall back to memory locally
    let nonce_store: Arc<dyn NonceStore> = match environment.redis_url() {
        Some(url) => {
            let redis_client = RedisClient::new(&url).await?;
            info!("✅ Initialized Redis nonce store");
            Arc::new(RedisNonceStore::new(redis_client))
        }
        None => {
            info!("✅ Initialized in-memory nonce store");
            Arc::new(InMemoryNonceStore::new())
        }
    };

    let siwe_verifier: Arc<dyn SiweVerifier> = Arc::new(WorldchainSiweVerifier::new(
        JsonRpcClient::new(environment.worldchain_rpc_url()),
    ));

    let world_id_verifier: Arc<dyn WorldIdVerifier> =
        Arc::new(CloudVerifier::new(environment.world_id_verifier_url()));

    if environment.world_app_id().is_none() {
        tracing::warn!("WORLD_APP_ID is not set, /v1/verify will fail");
    }

    server::start(environment, nonce_store, siwe_verifier, world_id_verifier).await
}
