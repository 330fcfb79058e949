//! Marriage DAO client session: wallet connection, World ID verification
//! and `HumanBond` contract calls, driven through the World App host.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod auth_store;
pub mod backend_api;
pub mod config;
pub mod contract;
pub mod error;
pub mod host;
pub mod human;
pub mod wallet;

pub use auth_store::{AuthState, AuthStore, VerificationRecord};
pub use backend_api::{BackendApi, HttpBackendApi};
pub use config::SessionConfig;
pub use error::SessionError;
pub use host::{HostRuntime, UserAgentProbe};
pub use human::{HumanVerificationManager, VerificationProof, WorldAction};
pub use wallet::{WalletSessionManager, WalletState, WalletTrustMode};
