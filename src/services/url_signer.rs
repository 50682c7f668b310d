//! HMAC-signed, time-limited download URLs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every URL handed out.
pub const SIGNED_URL_TTL_MINUTES: i64 = 15;

/// Mints and checks capability URLs for `GET /objects/{key}`.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
    ttl: Duration,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Why a presented signature was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Expired,
    Invalid,
}

impl UrlSigner {
    pub fn new(secret: impl Into<Vec<u8>>, base_url: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl: Duration::minutes(SIGNED_URL_TTL_MINUTES),
        }
    }

    /// A fresh GET URL for `container/key`, valid for the signer's TTL from `now`.
    pub fn sign(&self, container: &str, key: &str, now: DateTime<Utc>) -> String {
        let expires = (now + self.ttl).timestamp();
        let signature = self.signature(container, key, expires);
        format!(
            "{}/objects/{}?expires={}&signature={}",
            self.base_url, key, expires, signature
        )
    }

    /// Check a signature taken from a download request.
    pub fn verify(
        &self,
        container: &str,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> SignatureCheck {
        let Ok(presented) = URL_SAFE_NO_PAD.decode(signature) else {
            return SignatureCheck::Invalid;
        };
        let mac = self.mac(container, key, expires);
        if mac.verify_slice(&presented).is_err() {
            return SignatureCheck::Invalid;
        }
        if now.timestamp() > expires {
            return SignatureCheck::Expired;
        }
        SignatureCheck::Valid
    }

    fn signature(&self, container: &str, key: &str, expires: i64) -> String {
        let mac = self.mac(container, key, expires);
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn mac(&self, container: &str, key: &str, expires: i64) -> HmacSha256 {
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC can take key of any size"),
        };
        mac.update(format!("GET\n{}/{}\n{}", container, key, expires).as_bytes());
        mac
    }
}
