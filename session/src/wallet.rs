//! Wallet session manager.
//!
//! `idle → connecting → connected | error`, and `connected → idle` on
//! disconnect. The connected address lives in the [`AuthStore`]; the manager
//! only keeps the in-flight flag and the last error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use common_types::{ResponseStatus, WalletAuthPayload};
use worldchain::address::parse_address;

use crate::{
    auth_store::AuthStore,
    backend_api::BackendApi,
    error::SessionError,
    host::{HostRuntime, WalletAuthRequest},
};

/// Statement shown in the wallet-auth prompt
pub const SIGN_IN_STATEMENT: &str =
    "Sign in to Marriage DAO to create your on-chain marriage proof";

/// Shown when the wallet prompt was dismissed or failed
pub const WALLET_AUTH_FAILED: &str = "Wallet authentication failed or was cancelled";

/// Fallback when the backend rejects without a message
const SIGNATURE_VERIFICATION_FAILED: &str = "Signature verification failed";

/// How far back the signed message is valid from
const NOT_BEFORE_HOURS: i64 = 24;

/// How long the signed message stays valid
const EXPIRATION_DAYS: i64 = 7;

/// How the connected address is established
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalletTrustMode {
    /// SIWE signed by the wallet and checked by the backend
    #[default]
    Verified,
    /// Address reported by the host, taken as is
    HostReported,
}

/// Observable state of the wallet session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletState {
    Idle,
    Connecting,
    Connected(String),
    Error(String),
}

/// Clears the in-flight flag when a flow ends, however it ends
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    /// Claims `flag`, or `Busy` if a flow already holds it
    pub(crate) fn claim(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| SessionError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Connects the World App wallet
pub struct WalletSessionManager {
    host: Arc<dyn HostRuntime>,
    backend: Arc<dyn BackendApi>,
    mode: WalletTrustMode,
    connecting: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl WalletSessionManager {
    #[must_use]
    pub fn new(
        host: Arc<dyn HostRuntime>,
        backend: Arc<dyn BackendApi>,
        mode: WalletTrustMode,
    ) -> Self {
        if mode == WalletTrustMode::HostReported {
            tracing::warn!(
                "Wallet addresses are taken from the host without signature verification"
            );
        }

        Self {
            host,
            backend,
            mode,
            connecting: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> WalletTrustMode {
        self.mode
    }

    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    /// Error of the last failed `connect`, cleared by success or disconnect
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, error: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    #[must_use]
    pub fn state(&self, store: &AuthStore) -> WalletState {
        if self.is_connecting() {
            return WalletState::Connecting;
        }
        if let Some(address) = store.wallet_address() {
            return WalletState::Connected(address);
        }
        self.error().map_or(WalletState::Idle, WalletState::Error)
    }

    /// Connects the wallet and persists its address.
    ///
    /// # Errors
    ///
    /// - `SessionError::Busy` if a connect is already running; nothing changes
    /// - `SessionError::NotInHost` outside World App; nothing changes
    /// - `SessionError::Cancelled` if the wallet prompt was dismissed
    /// - `SessionError::Validation` if the host reports a malformed address
    /// - `SessionError::Rejected` with the backend's message if the signature was refused
    /// - `SessionError::Transport` if the backend could not be reached
    pub async fn connect(&self, store: &AuthStore) -> Result<String, SessionError> {
        if !self.host.is_installed() {
            tracing::warn!("Wallet connection attempted outside World App");
            return Err(SessionError::NotInHost);
        }

        let _in_flight = InFlight::claim(&self.connecting)?;
        self.set_error(None);

        let result = match self.mode {
            WalletTrustMode::Verified => self.connect_verified().await,
            WalletTrustMode::HostReported => self.connect_host_reported(),
        };

        match result {
            Ok(address) => {
                store.set_wallet_address(address.clone());
                tracing::info!("Wallet connected: {address}");
                Ok(address)
            }
            Err(err) => {
                tracing::warn!("Wallet connection failed: {err}");
                self.set_error(Some(err.to_string()));
                Err(err)
            }
        }
    }

    async fn connect_verified(&self) -> Result<String, SessionError> {
        let nonce = self.backend.fetch_nonce().await?;

        let payload = self.request_wallet_auth(nonce.clone()).await?;
        let fallback_address = payload.address.clone();

        let response = self.backend.complete_siwe(payload, nonce).await?;
        if !response.is_valid || response.status != ResponseStatus::Success {
            return Err(SessionError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| SIGNATURE_VERIFICATION_FAILED.to_string()),
            ));
        }

        Ok(response.address.unwrap_or(fallback_address))
    }

    async fn request_wallet_auth(&self, nonce: String) -> Result<WalletAuthPayload, SessionError> {
        let now = Utc::now();
        let request = WalletAuthRequest {
            nonce,
            request_id: "0".to_string(),
            statement: SIGN_IN_STATEMENT.to_string(),
            not_before: now - Duration::hours(NOT_BEFORE_HOURS),
            expiration_time: now + Duration::days(EXPIRATION_DAYS),
        };

        let payload = self.host.wallet_auth(request).await.map_err(|e| {
            tracing::debug!("Wallet auth prompt failed: {e}");
            SessionError::Cancelled(WALLET_AUTH_FAILED.to_string())
        })?;

        if payload.status != "success" {
            return Err(SessionError::Cancelled(WALLET_AUTH_FAILED.to_string()));
        }
        Ok(payload)
    }

    fn connect_host_reported(&self) -> Result<String, SessionError> {
        let address = self
            .host
            .wallet_address()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .ok_or_else(|| SessionError::Cancelled(WALLET_AUTH_FAILED.to_string()))?;

        parse_address(&address).map_err(|_| {
            SessionError::Validation(format!("Host reported an invalid wallet address: {address}"))
        })?;
        Ok(address)
    }

    /// Forgets the wallet. Safe to call when not connected.
    pub fn disconnect(&self, store: &AuthStore) {
        store.clear_wallet();
        self.set_error(None);
    }
}
