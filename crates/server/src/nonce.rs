//! Anti-forgery tokens for the feed endpoint.
//!
//! A token is an HMAC-SHA256 over `"{action}|{tick}"`, where the tick
//! advances every half lifetime. Tokens minted in the current or the
//! previous tick verify, so a token stays valid for 12 to 24 hours.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ServerError;

type HmacSha256 = Hmac<Sha256>;

/// Full token lifetime in seconds.
pub const NONCE_LIFETIME_SECS: i64 = 24 * 60 * 60;

pub trait NonceVerifier: Send + Sync {
    fn create(&self, action: &str) -> String;

    fn verify(&self, action: &str, token: &str) -> bool;
}

pub struct HmacNonce {
    mac: HmacSha256,
}

impl HmacNonce {
    pub fn new(secret: &[u8]) -> Result<Self, ServerError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| ServerError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }

    fn tick(now_secs: i64) -> i64 {
        now_secs.div_euclid(NONCE_LIFETIME_SECS / 2)
    }

    fn sign(&self, action: &str, tick: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(format!("{action}|{tick}").as_bytes());
        mac
    }

    pub fn create_at(&self, action: &str, now_secs: i64) -> String {
        hex::encode(self.sign(action, Self::tick(now_secs)).finalize().into_bytes())
    }

    pub fn verify_at(&self, action: &str, token: &str, now_secs: i64) -> bool {
        let Ok(expected) = hex::decode(token.trim()) else {
            return false;
        };

        let tick = Self::tick(now_secs);
        [tick, tick - 1]
            .into_iter()
            .any(|t| self.sign(action, t).verify_slice(&expected).is_ok())
    }
}

impl NonceVerifier for HmacNonce {
    fn create(&self, action: &str) -> String {
        self.create_at(action, chrono::Utc::now().timestamp())
    }

    fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, chrono::Utc::now().timestamp())
    }
}

/// Accepts every token. Used when no secret is configured.
pub struct DisabledNonce;

impl NonceVerifier for DisabledNonce {
    fn create(&self, _action: &str) -> String {
        String::new()
    }

    fn verify(&self, _action: &str, _token: &str) -> bool {
        true
    }
}
