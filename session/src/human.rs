//! Human-verification session manager.
//!
//! Obtains a World ID proof from the host for an action and signal, has the
//! backend check it, and records the verification in the [`AuthStore`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use common_types::{VerificationLevel, WorldIdProof};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    auth_store::{AuthStore, VerificationRecord},
    backend_api::BackendApi,
    error::SessionError,
    host::{HostRuntime, VerifyCommand},
    wallet::InFlight,
};

/// Shown when the proof prompt was dismissed or failed
pub const VERIFICATION_FAILED: &str = "Verification failed or was cancelled";

/// Shown when the backend did not accept the proof
pub const VERIFICATION_NOT_ACCEPTED: &str = "World ID verification was not accepted";

/// Proof returned by the host
pub type VerificationProof = WorldIdProof;

/// Actions registered in the Developer Portal
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WorldAction {
    CreateMarriageProposal,
    AcceptMarriageProposal,
}

/// Verifies that the user is a unique human
pub struct HumanVerificationManager {
    host: Arc<dyn HostRuntime>,
    backend: Arc<dyn BackendApi>,
    verifying: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl HumanVerificationManager {
    #[must_use]
    pub const fn new(host: Arc<dyn HostRuntime>, backend: Arc<dyn BackendApi>) -> Self {
        Self {
            host,
            backend,
            verifying: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_verifying(&self) -> bool {
        self.verifying.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_outcome<T>(&self, result: &Result<T, SessionError>) {
        let error = result.as_ref().err().map(ToString::to_string);
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Requests a World ID proof from the host. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// - `SessionError::Busy` if a verification is already running
    /// - `SessionError::NotInHost` outside World App
    /// - `SessionError::Cancelled` if the prompt was dismissed
    pub async fn verify(
        &self,
        action: WorldAction,
        signal: Option<&str>,
        level: VerificationLevel,
    ) -> Result<VerificationProof, SessionError> {
        let _in_flight = InFlight::claim(&self.verifying)?;
        let result = self.request_proof(action, signal, level).await;
        self.record_outcome(&result);
        result
    }

    async fn request_proof(
        &self,
        action: WorldAction,
        signal: Option<&str>,
        level: VerificationLevel,
    ) -> Result<VerificationProof, SessionError> {
        if !self.host.is_installed() {
            return Err(SessionError::NotInHost);
        }

        self.host
            .verify(VerifyCommand {
                action,
                signal: signal.map(ToString::to_string),
                verification_level: level,
            })
            .await
            .map_err(|e| {
                tracing::debug!("World ID prompt failed for {action}: {e}");
                SessionError::Cancelled(VERIFICATION_FAILED.to_string())
            })
    }

    /// Whether the backend accepted `proof` for `action` and `signal`.
    /// Transport failures count as not accepted.
    pub async fn verify_on_backend(
        &self,
        proof: &VerificationProof,
        action: WorldAction,
        signal: Option<&str>,
    ) -> bool {
        match self
            .backend
            .verify_proof(
                proof.clone(),
                action.to_string(),
                signal.map(ToString::to_string),
            )
            .await
        {
            Ok(response) => {
                if !response.is_accepted() {
                    tracing::warn!(
                        "Backend rejected World ID proof for {action}: {}",
                        response.error.as_deref().unwrap_or("no detail")
                    );
                }
                response.is_accepted()
            }
            Err(err) => {
                tracing::error!("Backend verification failed: {err}");
                false
            }
        }
    }

    /// Gets a proof, has the backend check it and records the verification.
    /// The store is only touched when the backend accepted the proof.
    ///
    /// # Errors
    ///
    /// Everything [`Self::verify`] returns, plus `SessionError::Rejected`
    /// when the backend did not accept the proof.
    pub async fn verify_and_record(
        &self,
        store: &AuthStore,
        action: WorldAction,
        signal: Option<&str>,
        level: VerificationLevel,
    ) -> Result<VerificationProof, SessionError> {
        let _in_flight = InFlight::claim(&self.verifying)?;

        let result: Result<VerificationProof, SessionError> = async {
            let proof = self.request_proof(action, signal, level).await?;
            if !self.verify_on_backend(&proof, action, signal).await {
                return Err(SessionError::Rejected(VERIFICATION_NOT_ACCEPTED.to_string()));
            }
            Ok(proof)
        }
        .await;

        self.record_outcome(&result);
        let proof = result?;

        store.set_verified(VerificationRecord::now(
            proof.nullifier_hash.clone(),
            proof.verification_level,
        ));
        tracing::info!("World ID verified for {action}");
        Ok(proof)
    }
}
