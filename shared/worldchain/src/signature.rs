//! EIP-191 personal-message signatures and World ID field hashing

use alloy_primitives::{Address, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::{
    abi::{keccak256, Word},
    error::ChainError,
};

/// Length of an `r || s || v` signature
const SIGNATURE_LEN: usize = 65;

/// EIP-191 hash of a personal message:
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`
#[must_use]
pub fn hash_message(message: &[u8]) -> Word {
    let mut eth_message = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    eth_message.extend_from_slice(message);
    keccak256(eth_message)
}

/// Address owning a secp256k1 public key
#[must_use]
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Parses a hex `r || s || v` signature into raw bytes
///
/// # Errors
/// Returns `ChainError::InvalidSignature` if the value is not 65 bytes of hex.
pub fn parse_signature(signature: &str) -> Result<[u8; SIGNATURE_LEN], ChainError> {
    let hex_part = signature.strip_prefix("0x").unwrap_or(signature);
    let mut bytes = [0u8; SIGNATURE_LEN];
    hex::decode_to_slice(hex_part, &mut bytes).map_err(|e| {
        ChainError::InvalidSignature(format!("Signature must be 65 bytes of hex: {e}"))
    })?;
    Ok(bytes)
}

/// Recovers the signer of a personal message.
///
/// Accepts `v` as 0/1 or 27/28. High-s signatures are normalized before
/// recovery.
///
/// # Errors
/// Returns `ChainError::InvalidSignature` if the signature is malformed or no
/// key can be recovered.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<Address, ChainError> {
    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        v => {
            return Err(ChainError::InvalidSignature(format!(
                "Unsupported recovery byte {v}"
            )))
        }
    };

    let mut sig = Signature::from_slice(&signature[..64])
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;
    let mut recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| ChainError::InvalidSignature("Invalid recovery id".to_string()))?;

    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let prehash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))?;

    Ok(public_key_to_address(&key))
}

/// World ID `hashToField`: keccak256 of the bytes shifted right by 8 bits so
/// the result fits the SNARK scalar field.
#[must_use]
pub fn hash_to_field(data: &[u8]) -> U256 {
    U256::from_be_bytes(keccak256(data)) >> 8
}

/// `hash_to_field` rendered as the 0x-prefixed 32-byte hex the cloud verifier expects
#[must_use]
pub fn hash_to_field_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(hash_to_field(data).to_be_bytes::<32>()))
}
