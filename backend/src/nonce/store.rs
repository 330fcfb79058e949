use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::time::timeout;

use super::NonceStoreError;

const REDIS_TIMEOUT: Duration = Duration::from_secs(3);

/// Key prefix for nonce entries in Redis
const REDIS_KEY_PREFIX: &str = "nonce:";

/// Server-side record of issued nonces
#[async_trait::async_trait]
pub trait NonceStore: Send + Sync {
    /// Records `nonce` as live for `ttl`
    async fn issue(&self, nonce: &str, ttl: Duration) -> Result<(), NonceStoreError>;

    /// Whether `nonce` was issued and is neither expired nor consumed
    async fn is_live(&self, nonce: &str) -> Result<bool, NonceStoreError>;

    /// Atomically removes `nonce`; returns `true` only for the caller that
    /// took a live entry
    async fn consume(&self, nonce: &str) -> Result<bool, NonceStoreError>;
}

/// Process-local nonce store, the default when no Redis is configured
#[derive(Default)]
pub struct InMemoryNonceStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl InMemoryNonceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NonceStore for InMemoryNonceStore {
    async fn issue(&self, nonce: &str, ttl: Duration) -> Result<(), NonceStoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop expired entries so abandoned sign-ins don't accumulate
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(nonce.to_string(), now + ttl);
        Ok(())
    }

    async fn is_live(&self, nonce: &str) -> Result<bool, NonceStoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(nonce)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }

    async fn consume(&self, nonce: &str) -> Result<bool, NonceStoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .remove(nonce)
            .is_some_and(|expires_at| expires_at > Instant::now()))
    }
}

#[derive(Clone)]
pub struct RedisClient {
    connection_manager: ConnectionManager,
}

impl RedisClient {
    /// Create a new Redis client with connection manager
    ///
    /// # Errors
    /// Returns an error if:
    /// - The Redis URL is invalid
    /// - Connection to Redis server fails
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let client = Client::open(url)?;
        let connection_manager = ConnectionManager::new(client).await?;

        Ok(Self { connection_manager })
    }

    /// Get a clone of the connection manager
    #[must_use]
    pub fn conn(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }
}

/// Redis-backed nonce store, shared by all backend replicas
#[derive(Clone)]
pub struct RedisNonceStore {
    redis_client: RedisClient,
}

impl RedisNonceStore {
    #[must_use]
    pub const fn new(redis_client: RedisClient) -> Self {
        Self { redis_client }
    }

    fn key(nonce: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{nonce}")
    }
}

#[async_trait::async_trait]
impl NonceStore for RedisNonceStore {
    async fn issue(&self, nonce: &str, ttl: Duration) -> Result<(), NonceStoreError> {
        let mut conn = self.redis_client.conn();
        timeout(
            REDIS_TIMEOUT,
            conn.set_ex::<_, _, ()>(Self::key(nonce), 1, ttl.as_secs().max(1)),
        )
        .await
        .map_err(|_| NonceStoreError::Timeout)??;
        Ok(())
    }

    async fn is_live(&self, nonce: &str) -> Result<bool, NonceStoreError> {
        let mut conn = self.redis_client.conn();
        let exists = timeout(REDIS_TIMEOUT, conn.exists::<_, bool>(Self::key(nonce)))
            .await
            .map_err(|_| NonceStoreError::Timeout)??;
        Ok(exists)
    }

    async fn consume(&self, nonce: &str) -> Result<bool, NonceStoreError> {
        let mut conn = self.redis_client.conn();
        // GETDEL keeps take-once semantics across replicas
        let taken = timeout(
            REDIS_TIMEOUT,
            conn.get_del::<_, Option<i64>>(Self::key(nonce)),
        )
        .await
        .map_err(|_| NonceStoreError::Timeout)??;
        Ok(taken.is_some())
    }
}
