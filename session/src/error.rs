use thiserror::Error;
use worldchain::ChainError;

/// Shown when the host runtime is not World App
pub const NOT_IN_WORLD_APP: &str = "This app must be opened in World App";

/// Failure of a session flow. Every flow returns one of these instead of
/// panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The host runtime is not World App
    #[error("This app must be opened in World App")]
    NotInHost,

    /// The user dismissed the host prompt or the host reported an error
    #[error("{0}")]
    Cancelled(String),

    /// Input was rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// The backend or the chain refused the request
    #[error("{0}")]
    Rejected(String),

    /// The backend or the chain could not be reached
    #[error("{0}")]
    Transport(String),

    /// Another flow of the same manager is still running
    #[error("Another request is already in progress")]
    Busy,
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<ChainError> for SessionError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidAddress(msg)
            | ChainError::InvalidProof(msg)
            | ChainError::InvalidSignature(msg) => Self::Validation(msg),
            ChainError::Rpc { message, .. } => Self::Rejected(message),
            ChainError::AbiDecode(_)
            | ChainError::NetworkError(_)
            | ChainError::InvalidRpcResponse(_) => Self::Transport(err.to_string()),
        }
    }
}
