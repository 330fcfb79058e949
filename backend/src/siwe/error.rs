use thiserror::Error;
use worldchain::ChainError;

/// Errors raised while verifying a wallet-auth payload
#[derive(Debug, Error)]
pub enum SiweError {
    #[error("Invalid SIWE message: {0}")]
    InvalidMessage(String),

    #[error("Nonce does not match the issued nonce")]
    NonceMismatch,

    #[error("Address does not match the signed message")]
    AddressMismatch,

    #[error("Message has expired")]
    Expired,

    #[error("Message is not yet valid")]
    NotYetValid,

    #[error("Signature does not belong to the address")]
    InvalidSignature,

    /// Could not reach the chain to check a contract wallet signature
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

impl SiweError {
    /// Whether the failure was caused by infrastructure rather than the payload
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Chain(ChainError::NetworkError(_) | ChainError::InvalidRpcResponse(_))
        )
    }
}
