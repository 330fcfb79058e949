//! Session library configuration

use std::env;

use worldchain::{address::parse_address, Address, WORLDCHAIN_PUBLIC_RPC_URL};

use crate::error::SessionError;

/// Backend used when `MARRIAGE_DAO_BACKEND_URL` is not set
const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// Endpoints and contract addresses the session flows talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base URL of the Marriage DAO backend
    pub backend_url: String,
    /// Worldchain JSON-RPC endpoint for contract reads
    pub rpc_url: String,
    /// Deployed `HumanBond` contract
    pub human_bond: Address,
}

impl SessionConfig {
    /// Reads the configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` if `HUMAN_BOND_ADDRESS` is missing or not an address
    pub fn from_env() -> Result<Self, SessionError> {
        let human_bond = env::var("HUMAN_BOND_ADDRESS").map_err(|_| {
            SessionError::Validation("HUMAN_BOND_ADDRESS environment variable is not set".to_string())
        })?;

        Ok(Self {
            backend_url: env::var("MARRIAGE_DAO_BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            rpc_url: env::var("WORLDCHAIN_RPC_URL")
                .unwrap_or_else(|_| WORLDCHAIN_PUBLIC_RPC_URL.to_string()),
            human_bond: parse_address(human_bond.trim())?,
        })
    }
}
