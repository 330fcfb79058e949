use thiserror::Error;

/// Error types for World ID cloud verification
#[derive(Debug, Error)]
pub enum WorldIdError {
    /// `WORLD_APP_ID` is not set or is not an app id
    #[error("Invalid World ID app id: {0}")]
    InvalidAppId(String),

    /// Network error when communicating with the verifier
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Unexpected response format or status from the verifier
    #[error("Verifier error: {0}")]
    InvalidVerifierResponse(String),
}
