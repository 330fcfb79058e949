use backend::siwe::SiweMessage;
use chrono::{DateTime, Duration, Utc};
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use worldchain::{
    address::to_lower_hex,
    signature::{hash_message, public_key_to_address},
    WORLDCHAIN_CHAIN_ID,
};

/// Externally owned account signing SIWE messages like World App does
pub struct TestWallet {
    signing_key: SigningKey,
    pub address: String,
}

impl TestWallet {
    pub fn random() -> Self {
        let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
        let address = to_lower_hex(&public_key_to_address(signing_key.verifying_key()));
        Self {
            signing_key,
            address,
        }
    }

    /// SIWE message valid from a day ago for a week, as the client requests it
    pub fn message(&self, nonce: &str) -> SiweMessage {
        let now = Utc::now();
        self.message_with_window(nonce, now - Duration::hours(24), now + Duration::days(7))
    }

    pub fn message_with_window(
        &self,
        nonce: &str,
        not_before: DateTime<Utc>,
        expiration_time: DateTime<Utc>,
    ) -> SiweMessage {
        SiweMessage {
            domain: "marriage-dao.example".to_string(),
            address: self.address.clone(),
            statement: Some(
                "Sign in to Marriage DAO to create your on-chain marriage proof".to_string(),
            ),
            uri: "https://marriage-dao.example".to_string(),
            version: "1".to_string(),
            chain_id: WORLDCHAIN_CHAIN_ID,
            nonce: nonce.to_string(),
            issued_at: Utc::now(),
            expiration_time: Some(expiration_time),
            not_before: Some(not_before),
            request_id: None,
            resources: Vec::new(),
        }
    }

    /// EIP-191 signature as `0x` + 130 hex characters (`v` is 27/28)
    pub fn sign(&self, message: &str) -> String {
        let hash = hash_message(message.as_bytes());
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash)
            .expect("Failed to sign message");

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        format!("0x{}", hex::encode(bytes))
    }

    /// `complete-siwe` request body for `message` signed by this wallet
    pub fn complete_siwe_request(&self, message: &SiweMessage, nonce: &str) -> Value {
        let message = message.to_string();
        json!({
            "payload": {
                "status": "success",
                "message": message,
                "signature": self.sign(&message),
                "address": self.address,
                "version": 1,
            },
            "nonce": nonce,
        })
    }
}
