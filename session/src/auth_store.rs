//! Persisted wallet session and human-verification record.
//!
//! The state survives restarts through a [`StatePersistence`] backend and
//! is saved after every mutation. A verification record older than 24 hours
//! is never observable: readers apply the expiry before answering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use common_types::VerificationLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key the state is stored under
pub const STORAGE_KEY: &str = "marriage-dao-auth";

/// Verification records expire after 24 hours
pub const VERIFICATION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Clock skew tolerated on a record stamped in the future
pub const MAX_CLOCK_SKEW_MS: i64 = 5 * 60 * 1000;

/// Version written next to the state
const STATE_VERSION: u32 = 0;

/// Proof of humanity accepted by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub nullifier_hash: String,
    pub verification_level: VerificationLevel,
    /// Unix milliseconds
    pub verified_at: i64,
}

impl VerificationRecord {
    /// Record stamped with the current time
    #[must_use]
    pub fn now(nullifier_hash: String, verification_level: VerificationLevel) -> Self {
        Self {
            nullifier_hash,
            verification_level,
            verified_at: Utc::now().timestamp_millis(),
        }
    }

    /// Whether the record is older than 24 hours at `now_ms`.
    /// A timestamp that cannot be aged, or lies further in the future than
    /// [`MAX_CLOCK_SKEW_MS`], counts as expired.
    #[must_use]
    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        match now_ms.checked_sub(self.verified_at) {
            Some(age) => age > VERIFICATION_TTL_MS || age < -MAX_CLOCK_SKEW_MS,
            None => true,
        }
    }
}

/// Everything the session persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub wallet_address: Option<String>,
    pub verification_data: Option<VerificationRecord>,
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    state: AuthState,
    version: u32,
}

/// Errors raised by persistence backends
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid stored state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for the serialized auth state
pub trait StatePersistence: Send + Sync {
    /// Loads the stored state, `None` if nothing was saved yet
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read or holds invalid data
    fn load(&self) -> Result<Option<AuthState>, PersistenceError>;

    /// Replaces the stored state
    ///
    /// # Errors
    /// Returns an error if the state cannot be written
    fn save(&self, state: &AuthState) -> Result<(), PersistenceError>;
}

/// JSON file named after [`STORAGE_KEY`]
pub struct FileStatePersistence {
    path: PathBuf,
}

impl FileStatePersistence {
    /// Stores the state in `<dir>/marriage-dao-auth.json`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatePersistence for FileStatePersistence {
    fn load(&self) -> Result<Option<AuthState>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedState = serde_json::from_str(&contents)?;
        Ok(Some(persisted.state))
    }

    fn save(&self, state: &AuthState) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec(&PersistedState {
            state: state.clone(),
            version: STATE_VERSION,
        })?;

        // Readers see either the old or the new file, never a partial one
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Process-local persistence, lost on restart
#[derive(Default)]
pub struct MemoryStatePersistence {
    stored: Mutex<Option<String>>,
}

impl MemoryStatePersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePersistence for MemoryStatePersistence {
    fn load(&self) -> Result<Option<AuthState>, PersistenceError> {
        let stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        stored
            .as_deref()
            .map(|json| serde_json::from_str::<PersistedState>(json).map(|p| p.state))
            .transpose()
            .map_err(Into::into)
    }

    fn save(&self, state: &AuthState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&PersistedState {
            state: state.clone(),
            version: STATE_VERSION,
        })?;
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }
}

/// Wallet session and verification record shared by the session flows
pub struct AuthStore {
    state: Mutex<AuthState>,
    persistence: Box<dyn StatePersistence>,
}

impl AuthStore {
    /// Opens the store, restoring whatever `persistence` holds
    ///
    /// # Errors
    /// Returns an error if the stored state cannot be read
    pub fn open(persistence: Box<dyn StatePersistence>) -> Result<Self, PersistenceError> {
        let state = persistence.load()?.unwrap_or_default();
        Ok(Self {
            state: Mutex::new(state),
            persistence,
        })
    }

    /// Empty store backed by memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            persistence: Box::new(MemoryStatePersistence::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` and saves the result
    fn update(&self, mutate: impl FnOnce(&mut AuthState)) {
        let mut state = self.lock();
        mutate(&mut state);
        if let Err(e) = self.persistence.save(&state) {
            // The in-memory state stays authoritative for this run
            tracing::error!("Failed to persist auth state: {e}");
        }
    }

    #[must_use]
    pub fn wallet_address(&self) -> Option<String> {
        self.lock().wallet_address.clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.lock().wallet_address.is_some()
    }

    pub fn set_wallet_address(&self, address: impl Into<String>) {
        let address = address.into();
        self.update(|state| state.wallet_address = Some(address));
    }

    pub fn clear_wallet(&self) {
        self.update(|state| state.wallet_address = None);
    }

    /// Whether a verification record younger than 24 hours exists
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.check_verification_expiry()
    }

    /// Current verification record, `None` once it expired
    #[must_use]
    pub fn verification_data(&self) -> Option<VerificationRecord> {
        if self.check_verification_expiry() {
            self.lock().verification_data.clone()
        } else {
            None
        }
    }

    pub fn set_verified(&self, record: VerificationRecord) {
        self.update(|state| state.verification_data = Some(record));
    }

    pub fn clear_verification(&self) {
        self.update(|state| state.verification_data = None);
    }

    /// Returns `true` while the record is valid. An expired record is
    /// cleared.
    pub fn check_verification_expiry(&self) -> bool {
        let now_ms = Utc::now().timestamp_millis();
        let expired = match &self.lock().verification_data {
            None => return false,
            Some(record) => record.is_expired_at(now_ms),
        };

        if expired {
            tracing::info!("World ID verification expired");
            self.clear_verification();
            return false;
        }
        true
    }

    /// Clears the wallet session and the verification record
    pub fn logout(&self) {
        self.update(|state| *state = AuthState::default());
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.lock().clone()
    }
}
