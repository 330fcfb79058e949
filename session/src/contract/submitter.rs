use std::sync::Arc;

use common_types::VerificationLevel;
use worldchain::{
    abi::{encode_call, Token},
    address::parse_address,
    proof::decode_proof,
    Address, U256,
};

use super::ACCEPT_SIGNATURE;
use crate::{
    error::SessionError,
    host::{HostRuntime, TransactionRequest},
    human::{HumanVerificationManager, VerificationProof, WorldAction},
};

/// Shown when the host did not send the transaction
pub const TRANSACTION_FAILED: &str = "Transaction failed or was rejected";

/// Shown for a malformed proposer address
pub const INVALID_ADDRESS: &str = "Please enter a valid Ethereum address";

fn parse_proposer(value: &str) -> Result<Address, SessionError> {
    parse_address(value).map_err(|_| SessionError::Validation(INVALID_ADDRESS.to_string()))
}

/// Parses a `0x`-prefixed hex field element such as a merkle root
fn parse_field(name: &str, value: &str) -> Result<U256, SessionError> {
    let hex_part = value.strip_prefix("0x").unwrap_or(value);
    if hex_part.is_empty() || hex_part.len() > 64 {
        return Err(SessionError::Validation(format!("Invalid {name}")));
    }
    U256::from_str_radix(hex_part, 16)
        .map_err(|_| SessionError::Validation(format!("Invalid {name}")))
}

/// Sends `HumanBond` transactions through the host wallet
pub struct ProposalSubmitter {
    host: Arc<dyn HostRuntime>,
    human_bond: Address,
}

impl ProposalSubmitter {
    #[must_use]
    pub const fn new(host: Arc<dyn HostRuntime>, human_bond: Address) -> Self {
        Self { host, human_bond }
    }

    /// Calldata for `accept` with the proof bound to `proposer`
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` if the address or any proof field is malformed
    pub fn accept_calldata(
        proposer: &str,
        verification: &VerificationProof,
    ) -> Result<Vec<u8>, SessionError> {
        let proposer = parse_proposer(proposer)?;
        let proof = decode_proof(&verification.proof)?;
        let merkle_root = parse_field("merkle root", &verification.merkle_root)?;
        let nullifier_hash = parse_field("nullifier hash", &verification.nullifier_hash)?;

        Ok(encode_call(
            ACCEPT_SIGNATURE,
            &[
                Token::Address(proposer),
                Token::Uint(merkle_root),
                Token::Uint(nullifier_hash),
                Token::FixedUintArray(proof.to_vec()),
            ],
        ))
    }

    /// Accepts `proposer`'s proposal; returns the host's transaction id.
    /// Input is validated before anything reaches the host.
    ///
    /// # Errors
    ///
    /// - `SessionError::Validation` for a malformed address or proof
    /// - `SessionError::NotInHost` outside World App
    /// - `SessionError::Rejected` if the host did not send the transaction
    pub async fn accept(
        &self,
        proposer: &str,
        verification: &VerificationProof,
    ) -> Result<String, SessionError> {
        let data = Self::accept_calldata(proposer, verification)?;

        if !self.host.is_installed() {
            return Err(SessionError::NotInHost);
        }

        let transaction_id = self
            .host
            .send_transaction(TransactionRequest {
                to: self.human_bond,
                data,
            })
            .await
            .map_err(|e| {
                tracing::warn!("accept transaction failed: {e}");
                SessionError::Rejected(TRANSACTION_FAILED.to_string())
            })?;

        tracing::info!("accept transaction sent: {transaction_id}");
        Ok(transaction_id)
    }

    /// Proves humanity for accepting `proposer`'s proposal, then accepts it.
    /// The proof is checked by the contract, not the backend.
    ///
    /// # Errors
    ///
    /// Everything [`HumanVerificationManager::verify`] and [`Self::accept`] return
    pub async fn verify_and_accept(
        &self,
        human: &HumanVerificationManager,
        proposer: &str,
    ) -> Result<String, SessionError> {
        parse_proposer(proposer)?;

        let verification = human
            .verify(
                WorldAction::AcceptMarriageProposal,
                Some(proposer),
                VerificationLevel::Orb,
            )
            .await?;

        self.accept(proposer, &verification).await
    }
}
