#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use common_types::{
    CloudVerifyResult, CompleteSiweResponse, VerificationLevel, VerifyResponse,
    WalletAuthPayload, WorldIdProof,
};
use session::{
    error::SessionError,
    host::{HostCommandError, HostRuntime, TransactionRequest, VerifyCommand, WalletAuthRequest},
    BackendApi,
};
use tokio::sync::Notify;

pub const WALLET_ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
pub const HUMAN_BOND: &str = "0x00000000000000000000000000000000000000b0";

pub fn proof() -> WorldIdProof {
    WorldIdProof {
        proof: format!("0x{}", (1..=8).map(|i| format!("{i:064x}")).collect::<String>()),
        merkle_root: "0x2a7c09e8af01f39a87d89e9f0a9ba66fbf6fb304cc643051dd4ea24c4e9f7e8d".to_string(),
        nullifier_hash: "0x1359a81e3a42dc1c34786cbefbcc672a3d730510dba7a3be9941b207b0cf52fa"
            .to_string(),
        verification_level: VerificationLevel::Orb,
    }
}

/// Scriptable stand-in for World App
pub struct FakeHost {
    pub installed: bool,
    pub reported_address: Option<String>,
    pub wallet_auth_result: Mutex<Result<WalletAuthPayload, HostCommandError>>,
    pub verify_result: Mutex<Result<WorldIdProof, HostCommandError>>,
    pub transaction_result: Mutex<Result<String, HostCommandError>>,
    pub wallet_auth_requests: Mutex<Vec<WalletAuthRequest>>,
    pub verify_commands: Mutex<Vec<VerifyCommand>>,
    pub transactions: Mutex<Vec<TransactionRequest>>,
}

impl FakeHost {
    pub fn world_app() -> Self {
        Self {
            installed: true,
            reported_address: Some(WALLET_ADDRESS.to_string()),
            wallet_auth_result: Mutex::new(Ok(WalletAuthPayload {
                status: "success".to_string(),
                message: "signed message".to_string(),
                signature: format!("0x{}", "a".repeat(130)),
                address: WALLET_ADDRESS.to_string(),
                version: 1,
            })),
            verify_result: Mutex::new(Ok(proof())),
            transaction_result: Mutex::new(Ok("tx-123".to_string())),
            wallet_auth_requests: Mutex::new(Vec::new()),
            verify_commands: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }

    pub fn browser() -> Self {
        Self {
            installed: false,
            reported_address: None,
            ..Self::world_app()
        }
    }

    pub fn command_count(&self) -> usize {
        self.wallet_auth_requests.lock().unwrap().len()
            + self.verify_commands.lock().unwrap().len()
            + self.transactions.lock().unwrap().len()
    }
}

#[async_trait]
impl HostRuntime for FakeHost {
    fn is_installed(&self) -> bool {
        self.installed
    }

    fn wallet_address(&self) -> Option<String> {
        self.reported_address.clone()
    }

    async fn wallet_auth(
        &self,
        request: WalletAuthRequest,
    ) -> Result<WalletAuthPayload, HostCommandError> {
        self.wallet_auth_requests.lock().unwrap().push(request);
        self.wallet_auth_result.lock().unwrap().clone()
    }

    async fn verify(&self, command: VerifyCommand) -> Result<WorldIdProof, HostCommandError> {
        self.verify_commands.lock().unwrap().push(command);
        self.verify_result.lock().unwrap().clone()
    }

    async fn send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Result<String, HostCommandError> {
        self.transactions.lock().unwrap().push(transaction);
        self.transaction_result.lock().unwrap().clone()
    }
}

/// Scriptable stand-in for the backend
pub struct FakeBackend {
    pub nonce: String,
    pub siwe_response: Mutex<Result<CompleteSiweResponse, SessionError>>,
    pub verify_response: Mutex<Result<VerifyResponse, SessionError>>,
    pub calls: AtomicUsize,
    /// When set, `fetch_nonce` signals `entered` and waits for `release`
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeBackend {
    pub fn accepting() -> Self {
        Self {
            nonce: "abc123xy".to_string(),
            siwe_response: Mutex::new(Ok(CompleteSiweResponse::success(
                WALLET_ADDRESS.to_string(),
            ))),
            verify_response: Mutex::new(Ok(VerifyResponse {
                verify_res: Some(CloudVerifyResult {
                    success: true,
                    code: None,
                    detail: None,
                    attribute: None,
                }),
                status: 200,
                error: None,
            })),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn fetch_nonce(&self) -> Result<String, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        Ok(self.nonce.clone())
    }

    async fn complete_siwe(
        &self,
        _payload: WalletAuthPayload,
        _nonce: String,
    ) -> Result<CompleteSiweResponse, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.siwe_response.lock().unwrap().clone()
    }

    async fn verify_proof(
        &self,
        _proof: WorldIdProof,
        _action: String,
        _signal: Option<String>,
    ) -> Result<VerifyResponse, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verify_response.lock().unwrap().clone()
    }
}
