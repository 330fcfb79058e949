//! Single-use SIWE nonces.
//!
//! A nonce is bound to the caller twice: through an HMAC-signed `siwe`
//! cookie and through a server-side entry with the same lifetime. The
//! cookie ties the nonce to the browser session; the store entry makes it
//! single use even if the cookie value is replayed.

mod cookie;
mod error;
mod store;

pub use cookie::NonceCookieSigner;
pub use error::NonceStoreError;
pub use store::{InMemoryNonceStore, NonceStore, RedisClient, RedisNonceStore};

/// Name of the cookie carrying the signed nonce
pub const NONCE_COOKIE_NAME: &str = "siwe";

/// Minimum nonce length accepted by SIWE
pub const MIN_NONCE_LEN: usize = 8;

/// Generates a fresh alphanumeric nonce (a v4 UUID without dashes)
#[must_use]
pub fn generate_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
