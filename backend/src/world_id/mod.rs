//! World ID proof verification through the Developer Portal cloud verifier.
//!
//! The backend never checks the zero-knowledge proof itself; it forwards the
//! proof with the hashed signal to `POST {base}/api/v2/verify/{app_id}` and
//! relays the verdict.

pub mod error;
pub mod verifier;

mod request;

pub use error::WorldIdError;
pub use verifier::{CloudVerifier, WorldIdVerifier};
