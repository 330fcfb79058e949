use thiserror::Error;

/// Errors raised while validating or encoding chain data
#[derive(Debug, Error)]
pub enum ChainError {
    /// The address is not `0x` followed by 40 hex characters
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The packed proof has the wrong length or is not hex
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// The signature is not a 65-byte `r || s || v` value or recovery failed
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Returned data does not match the expected ABI layout
    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    /// Network error when talking to the RPC node
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// The node answered with something that is not a JSON-RPC response
    #[error("Unexpected RPC response: {0}")]
    InvalidRpcResponse(String),
}
