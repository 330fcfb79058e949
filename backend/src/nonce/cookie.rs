use std::time::Duration;

use axum::http::HeaderValue;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::NONCE_COOKIE_NAME;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies the nonce cookie value (`<nonce>.<hex hmac>`)
#[derive(Clone)]
pub struct NonceCookieSigner {
    key: Vec<u8>,
}

impl NonceCookieSigner {
    #[must_use]
    pub const fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }

    /// Cookie value for `nonce`
    #[must_use]
    pub fn sign(&self, nonce: &str) -> String {
        let mut mac = self.mac();
        mac.update(nonce.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!("{nonce}.{}", hex::encode(tag))
    }

    /// Returns the nonce if the cookie value carries a valid signature
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<String> {
        let (nonce, tag_hex) = value.rsplit_once('.')?;
        let tag = hex::decode(tag_hex).ok()?;

        let mut mac = self.mac();
        mac.update(nonce.as_bytes());
        mac.verify_slice(&tag).ok()?;

        Some(nonce.to_string())
    }

    /// `Set-Cookie` header storing the signed nonce
    ///
    /// # Panics
    ///
    /// Panics if the nonce contains characters that are invalid in a header
    #[must_use]
    pub fn set_cookie(&self, nonce: &str, ttl: Duration) -> HeaderValue {
        let cookie = format!(
            "{NONCE_COOKIE_NAME}={}; Max-Age={}; Path=/; Secure; HttpOnly; SameSite=Strict",
            self.sign(nonce),
            ttl.as_secs()
        );
        HeaderValue::from_str(&cookie).expect("Nonce cookie must be a valid header value")
    }

    /// `Set-Cookie` header deleting the nonce cookie
    #[must_use]
    pub fn clear_cookie() -> HeaderValue {
        HeaderValue::from_static("siwe=; Max-Age=0; Path=/; Secure; HttpOnly; SameSite=Strict")
    }
}
