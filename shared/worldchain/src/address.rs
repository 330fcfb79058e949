//! EVM address validation

use alloy_primitives::Address;

use crate::error::ChainError;

/// Parses a `0x`-prefixed, 40 hex character address.
///
/// The checksum is not enforced: host wallets and users paste addresses in
/// every casing.
///
/// # Errors
/// Returns `ChainError::InvalidAddress` for anything else.
pub fn parse_address(value: &str) -> Result<Address, ChainError> {
    let hex_part = value
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidAddress("Address must start with 0x".to_string()))?;

    if hex_part.len() != 40 {
        return Err(ChainError::InvalidAddress(
            "Address must be 42 characters long".to_string(),
        ));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut bytes).map_err(|_| {
        ChainError::InvalidAddress("Address must contain only hexadecimal characters".to_string())
    })?;

    Ok(Address::from(bytes))
}

/// Lowercase `0x` hex rendering used for comparisons and persistence
#[must_use]
pub fn to_lower_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}
