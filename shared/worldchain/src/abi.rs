//! Minimal Solidity ABI encoding for the calls this workspace makes.
//!
//! Only what the contracts need: static words (`address`, `uint256`,
//! `bool`, `bytes32`), fixed `uint256[N]` arrays and one dynamic `bytes`
//! argument for ERC-1271.

use alloy_primitives::{Address, U256};
use sha3::{Digest, Keccak256};

use crate::error::ChainError;

/// Size of one ABI word
pub const WORD_SIZE: usize = 32;

/// One ABI-encoded word
pub type Word = [u8; WORD_SIZE];

/// Call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(U256),
    Bool(bool),
    FixedBytes(Word),
    /// `uint256[N]`, encoded in place
    FixedUintArray(Vec<U256>),
    /// Dynamic `bytes`, encoded in the tail
    Bytes(Vec<u8>),
}

/// Keccak-256 of `data`
#[must_use]
pub fn keccak256(data: impl AsRef<[u8]>) -> Word {
    Keccak256::digest(data.as_ref()).into()
}

/// The 4-byte selector of a canonical function signature, e.g. `getProposal(address)`
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[must_use]
pub fn address_word(address: &Address) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(address.as_slice());
    word
}

#[must_use]
pub fn uint_word(value: &U256) -> Word {
    value.to_be_bytes::<WORD_SIZE>()
}

#[must_use]
fn usize_word(value: usize) -> Word {
    uint_word(&U256::from(value))
}

/// Encodes a call as `selector || head || tail`
#[must_use]
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut encoded = selector(signature).to_vec();
    encoded.extend(encode_tokens(tokens));
    encoded
}

/// Encodes the argument tuple
#[must_use]
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_size: usize = tokens
        .iter()
        .map(|token| match token {
            Token::FixedUintArray(values) => values.len() * WORD_SIZE,
            _ => WORD_SIZE,
        })
        .sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(address) => head.extend_from_slice(&address_word(address)),
            Token::Uint(value) => head.extend_from_slice(&uint_word(value)),
            Token::Bool(value) => head.extend_from_slice(&usize_word(usize::from(*value))),
            Token::FixedBytes(word) => head.extend_from_slice(word),
            Token::FixedUintArray(values) => {
                for value in values {
                    head.extend_from_slice(&uint_word(value));
                }
            }
            Token::Bytes(bytes) => {
                head.extend_from_slice(&usize_word(head_size + tail.len()));
                tail.extend_from_slice(&usize_word(bytes.len()));
                tail.extend_from_slice(bytes);
                let padding = (WORD_SIZE - bytes.len() % WORD_SIZE) % WORD_SIZE;
                tail.extend(std::iter::repeat_n(0u8, padding));
            }
        }
    }

    head.extend(tail);
    head
}

/// Splits return data into words, rejecting anything that is not word aligned
///
/// # Errors
/// Returns `ChainError::AbiDecode` when the length is not a multiple of 32 or
/// fewer than `expected` words are present.
pub fn decode_words(data: &[u8], expected: usize) -> Result<Vec<Word>, ChainError> {
    if data.len() % WORD_SIZE != 0 {
        return Err(ChainError::AbiDecode(format!(
            "Return data length {} is not word aligned",
            data.len()
        )));
    }

    let words: Vec<Word> = data
        .chunks_exact(WORD_SIZE)
        .map(|chunk| {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(chunk);
            word
        })
        .collect();

    if words.len() < expected {
        return Err(ChainError::AbiDecode(format!(
            "Expected {expected} words, got {}",
            words.len()
        )));
    }

    Ok(words)
}

/// # Errors
/// Returns `ChainError::AbiDecode` if the upper 12 bytes are not zero.
pub fn word_to_address(word: &Word) -> Result<Address, ChainError> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(ChainError::AbiDecode("Dirty address word".to_string()));
    }
    Ok(Address::from_slice(&word[12..]))
}

/// # Errors
/// Returns `ChainError::AbiDecode` unless the word is exactly 0 or 1.
pub fn word_to_bool(word: &Word) -> Result<bool, ChainError> {
    match U256::from_be_bytes(*word) {
        v if v == U256::ZERO => Ok(false),
        v if v == U256::from(1u8) => Ok(true),
        _ => Err(ChainError::AbiDecode("Invalid bool word".to_string())),
    }
}

#[must_use]
pub fn word_to_uint(word: &Word) -> U256 {
    U256::from_be_bytes(*word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_matches_known_values() {
        // ERC-20 transfer and ERC-1271 isValidSignature
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(
            selector("isValidSignature(bytes32,bytes)"),
            [0x16, 0x26, 0xba, 0x7e]
        );
    }

    #[test]
    fn test_encode_static_call() {
        let address = Address::from([0x11; 20]);
        let encoded = encode_call(
            "transfer(address,uint256)",
            &[Token::Address(address), Token::Uint(U256::from(5u64))],
        );

        assert_eq!(encoded.len(), 4 + 2 * WORD_SIZE);
        assert_eq!(&encoded[4..16], &[0u8; 12]);
        assert_eq!(&encoded[16..36], &[0x11; 20]);
        assert_eq!(encoded[4 + 2 * WORD_SIZE - 1], 5);
    }

    #[test]
    fn test_encode_dynamic_bytes_offset_and_padding() {
        let encoded = encode_tokens(&[Token::FixedBytes([0xaa; 32]), Token::Bytes(vec![0xbb; 65])]);

        // head: bytes32 + offset, tail: length + 65 bytes padded to 96
        assert_eq!(encoded.len(), 2 * WORD_SIZE + WORD_SIZE + 3 * WORD_SIZE);
        assert_eq!(word_to_uint(&encoded[32..64].try_into().unwrap()), U256::from(64u64));
        assert_eq!(word_to_uint(&encoded[64..96].try_into().unwrap()), U256::from(65u64));
        assert_eq!(encoded[96 + 64], 0xbb);
        assert_eq!(encoded[96 + 65], 0);
    }

    #[test]
    fn test_fixed_array_is_encoded_in_place() {
        let values: Vec<U256> = (1u64..=8).map(U256::from).collect();
        let encoded = encode_tokens(&[Token::FixedUintArray(values), Token::Bytes(vec![1])]);

        // The offset of the trailing bytes skips all eight array words
        let offset: [u8; 32] = encoded[8 * WORD_SIZE..9 * WORD_SIZE].try_into().unwrap();
        assert_eq!(word_to_uint(&offset), U256::from(9 * WORD_SIZE));
    }

    #[test]
    fn test_decode_helpers() {
        let words = decode_words(&[0u8; 64], 2).unwrap();
        assert!(!word_to_bool(&words[0]).unwrap());
        assert_eq!(word_to_address(&words[1]).unwrap(), Address::ZERO);

        assert!(decode_words(&[0u8; 33], 1).is_err());
        assert!(decode_words(&[0u8; 32], 2).is_err());
        assert!(word_to_bool(&[0xff; 32]).is_err());
        assert!(word_to_address(&[0xff; 32]).is_err());
    }
}
