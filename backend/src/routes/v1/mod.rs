pub mod nonce;
pub mod siwe;
pub mod verify;
