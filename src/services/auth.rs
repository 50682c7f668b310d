//! Bearer-token verification against the identity provider's signing key.

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Caller identity established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
}

/// Verifies a raw bearer token. Implementations must be safe to share across
/// request tasks.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// Claims carried by identity-provider ID tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// HS256 ID-token verification with audience and expiry checks.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Option<Identity> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(Identity {
                subject: data.claims.sub,
                email: data.claims.email,
            }),
            Err(e) => {
                warn!("Token verification failed: {}", e);
                None
            }
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
pub mod test_support {
    use super::Claims;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const SECRET: &str = "test-auth-secret";
    pub const AUDIENCE: &str = "job-tracker-client";

    pub fn token_for(sub: &str, aud: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            aud: aud.to_string(),
            exp,
            email: Some(format!("{}@example.com", sub)),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn valid_token() -> String {
        token_for("user-1", AUDIENCE, chrono::Utc::now().timestamp() + 3600)
    }
}
