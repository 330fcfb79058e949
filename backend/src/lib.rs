//! Marriage DAO backend: wallet sign-in and World ID verification

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Single-use SIWE nonces
pub mod nonce;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Sign-In with Ethereum verification
pub mod siwe;

/// Configuration, errors and extractors
pub mod types;

/// World ID cloud verification
pub mod world_id;
