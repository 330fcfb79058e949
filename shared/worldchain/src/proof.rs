//! Packed World ID proof decoding.
//!
//! The host returns the Groth16 proof as one hex string holding eight
//! 32-byte big-endian words. Contracts take it as `uint256[8]`.

use alloy_primitives::U256;

use crate::error::ChainError;

/// Number of words in a packed proof
pub const PROOF_WORDS: usize = 8;

/// Hex characters per 32-byte word
const WORD_HEX_LEN: usize = 64;

/// Hex characters of a full packed proof (256 bytes)
pub const PROOF_HEX_LEN: usize = PROOF_WORDS * WORD_HEX_LEN;

/// Decoded `uint256[8]` proof
pub type ProofWords = [U256; PROOF_WORDS];

/// Decodes a packed proof into its eight words.
///
/// Accepts an optional `0x` prefix. The remaining string must be exactly
/// 512 hex characters; nothing is padded or truncated.
///
/// # Errors
/// Returns `ChainError::InvalidProof` on a wrong length or a non-hex character.
pub fn decode_proof(proof: &str) -> Result<ProofWords, ChainError> {
    let packed = proof.strip_prefix("0x").unwrap_or(proof);

    if packed.len() != PROOF_HEX_LEN {
        return Err(ChainError::InvalidProof(format!(
            "Proof must be {PROOF_HEX_LEN} hex characters, got {}",
            packed.len()
        )));
    }

    if !packed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ChainError::InvalidProof(
            "Proof must contain only hexadecimal characters".to_string(),
        ));
    }

    let mut words = [U256::ZERO; PROOF_WORDS];
    for (index, word) in words.iter_mut().enumerate() {
        let chunk = &packed[index * WORD_HEX_LEN..(index + 1) * WORD_HEX_LEN];
        *word = U256::from_str_radix(chunk, 16)
            .map_err(|e| ChainError::InvalidProof(format!("Invalid proof word {index}: {e}")))?;
    }

    Ok(words)
}
