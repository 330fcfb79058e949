//! Worldchain plumbing shared by the backend and the session client.
//!
//! Covers static ABI words, the packed World ID proof layout, EIP-191
//! signer recovery and a JSON-RPC `eth_call` client. Contract semantics
//! live in the callers.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod abi;
pub mod address;
pub mod error;
pub mod proof;
pub mod rpc;
pub mod signature;

pub use alloy_primitives::{Address, U256};
pub use error::ChainError;

/// Worldchain mainnet chain id
pub const WORLDCHAIN_CHAIN_ID: u64 = 480;

/// Public Worldchain mainnet RPC endpoint
pub const WORLDCHAIN_PUBLIC_RPC_URL: &str = "https://worldchain-mainnet.g.alchemy.com/public";
