use async_trait::async_trait;
use chrono::Utc;
use common_types::WalletAuthPayload;
use worldchain::{
    abi::{self, Token},
    address::parse_address,
    rpc::JsonRpcClient,
    signature::{hash_message, parse_signature, recover_personal_signer},
    Address, ChainError,
};

use super::{SiweError, SiweMessage};

/// Return value of `isValidSignature` for a valid signature
const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

const ERC1271_SIGNATURE: &str = "isValidSignature(bytes32,bytes)";

/// Verifies a wallet-auth payload against the nonce issued to the caller
#[async_trait]
pub trait SiweVerifier: Send + Sync {
    /// Returns the authenticated address
    ///
    /// # Errors
    /// Returns a `SiweError` describing why the payload was not accepted
    async fn verify(
        &self,
        payload: &WalletAuthPayload,
        expected_nonce: &str,
    ) -> Result<Address, SiweError>;
}

/// Verifies SIWE payloads signed by World App wallets.
///
/// EOA signatures are checked locally; anything else is checked through
/// the wallet contract's ERC-1271 `isValidSignature` on World Chain.
pub struct WorldchainSiweVerifier {
    rpc: JsonRpcClient,
}

impl WorldchainSiweVerifier {
    #[must_use]
    pub const fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }

    async fn is_valid_contract_signature(
        &self,
        wallet: &Address,
        message: &str,
        signature: &str,
    ) -> Result<bool, SiweError> {
        let signature_bytes = hex::decode(signature.trim_start_matches("0x"))
            .map_err(|_| SiweError::InvalidSignature)?;
        let data = abi::encode_call(
            ERC1271_SIGNATURE,
            &[
                Token::FixedBytes(hash_message(message.as_bytes())),
                Token::Bytes(signature_bytes),
            ],
        );

        let result = match self.rpc.eth_call(wallet, &data).await {
            Ok(result) => result,
            // Reverts and non-contract addresses mean the signature is not valid
            Err(ChainError::Rpc { code, message }) => {
                tracing::debug!(code, rpc_message = %message, "isValidSignature reverted");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(result.get(..4) == Some(&ERC1271_MAGIC_VALUE[..]))
    }
}

#[async_trait]
impl SiweVerifier for WorldchainSiweVerifier {
    async fn verify(
        &self,
        payload: &WalletAuthPayload,
        expected_nonce: &str,
    ) -> Result<Address, SiweError> {
        let message = SiweMessage::parse(&payload.message)?;

        if message.nonce != expected_nonce {
            return Err(SiweError::NonceMismatch);
        }

        let address = parse_address(&payload.address).map_err(|_| SiweError::AddressMismatch)?;
        let signed_address =
            parse_address(&message.address).map_err(|_| SiweError::AddressMismatch)?;
        if address != signed_address {
            return Err(SiweError::AddressMismatch);
        }

        message.check_time(Utc::now())?;

        let recovered = parse_signature(&payload.signature)
            .and_then(|signature| recover_personal_signer(payload.message.as_bytes(), &signature));
        if matches!(recovered, Ok(signer) if signer == address) {
            return Ok(address);
        }

        if self
            .is_valid_contract_signature(&address, &payload.message, &payload.signature)
            .await?
        {
            return Ok(address);
        }

        Err(SiweError::InvalidSignature)
    }
}
