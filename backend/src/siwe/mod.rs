//! Sign-In with Ethereum verification for World App wallet auth

mod error;
mod message;
mod verifier;

pub use error::SiweError;
pub use message::SiweMessage;
pub use verifier::{SiweVerifier, WorldchainSiweVerifier};
