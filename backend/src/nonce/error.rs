use thiserror::Error;

/// Errors raised by nonce store backends
#[derive(Debug, Error)]
pub enum NonceStoreError {
    /// Redis command failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis did not answer in time
    #[error("Redis timeout")]
    Timeout,
}
