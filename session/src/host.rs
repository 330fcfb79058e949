//! World App host runtime.
//!
//! The host owns the user's wallet and World ID credentials. Flows reach it
//! through [`HostRuntime`], so they can run against World App or a test
//! double alike.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_types::{VerificationLevel, WalletAuthPayload, WorldIdProof};
use thiserror::Error;
use worldchain::Address;

use crate::human::WorldAction;

/// Markers World App puts in its web view user agent
const WORLD_APP_USER_AGENT_MARKERS: [&str; 2] = ["MiniKit", "WorldApp"];

/// Failure of a host command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostCommandError {
    /// The user dismissed the prompt
    #[error("Cancelled by the user")]
    Cancelled,

    /// The host answered with an error payload
    #[error("Host error: {0}")]
    Failed(String),
}

/// Wallet-auth (SIWE) prompt parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAuthRequest {
    pub nonce: String,
    pub request_id: String,
    pub statement: String,
    pub not_before: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

/// World ID proof prompt parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCommand {
    pub action: WorldAction,
    pub signal: Option<String>,
    pub verification_level: VerificationLevel,
}

/// Contract call the host signs and sends from the user's wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    /// ABI-encoded calldata
    pub data: Vec<u8>,
}

/// Capabilities of the World App host runtime
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Whether the app is running inside World App
    fn is_installed(&self) -> bool;

    /// Wallet address the host reports for the current user, unverified
    fn wallet_address(&self) -> Option<String>;

    /// Asks the wallet to sign a SIWE message
    async fn wallet_auth(
        &self,
        request: WalletAuthRequest,
    ) -> Result<WalletAuthPayload, HostCommandError>;

    /// Asks the host to generate a World ID proof
    async fn verify(&self, command: VerifyCommand) -> Result<WorldIdProof, HostCommandError>;

    /// Sends a transaction; returns the host's transaction id
    async fn send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Result<String, HostCommandError>;
}

/// Detects World App from what a web view exposes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentProbe {
    /// `navigator.userAgent`, if readable
    pub user_agent: Option<String>,
    /// Whether a `MiniKit` global was injected into the page
    pub injected_global: bool,
}

impl UserAgentProbe {
    #[must_use]
    pub const fn new(user_agent: Option<String>, injected_global: bool) -> Self {
        Self {
            user_agent,
            injected_global,
        }
    }

    /// Whether any World App indicator is present
    #[must_use]
    pub fn is_world_app(&self) -> bool {
        let agent_matches = self.user_agent.as_deref().is_some_and(|agent| {
            WORLD_APP_USER_AGENT_MARKERS
                .iter()
                .any(|marker| agent.contains(marker))
        });

        agent_matches || self.injected_global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_markers() {
        let probe = UserAgentProbe::new(
            Some("Mozilla/5.0 (iPhone) AppleWebKit/605.1.15 WorldApp/2.8".to_string()),
            false,
        );
        assert!(probe.is_world_app());

        let probe = UserAgentProbe::new(Some("MiniKit/1.0".to_string()), false);
        assert!(probe.is_world_app());
    }

    #[test]
    fn test_injected_global() {
        assert!(UserAgentProbe::new(None, true).is_world_app());
    }

    #[test]
    fn test_plain_browser_is_not_world_app() {
        let probe = UserAgentProbe::new(
            Some("Mozilla/5.0 (Macintosh) Gecko/20100101 Firefox/128.0".to_string()),
            false,
        );
        assert!(!probe.is_world_app());
        assert!(!UserAgentProbe::default().is_world_app());
    }
}
