//! Signed token issuing and verification.
//!
//! The identity payload is embedded as JWT claims (HS256). Verification
//! checks signature and expiry; the decoded payload must round-trip back to
//! the identity that was signed at login.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::user::{Email, Identity, Role};

/// Errors surfaced while issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature or payload shape did not verify.
    #[error("token is invalid")]
    Invalid,
    /// Token verified but has expired.
    #[error("token has expired")]
    Expired,
    /// Signing failed; configuration-level fault.
    #[error("token could not be issued: {message}")]
    Issue { message: String },
}

/// JWT claims wrapping the identity payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    name: String,
    email: Email,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and verifies identity tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Sign a fresh token carrying the identity payload.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|err| TokenError::Issue {
            message: err.to_string(),
        })
    }

    /// Verify signature and expiry, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|err| {
                match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;
        let claims = data.claims;
        Ok(Identity {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: Email::new("ada@example.com").expect("valid email"),
            role: Role::Member,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", 60)
    }

    #[rstest]
    fn identity_round_trips_through_token() {
        let identity = identity();
        let codec = codec();
        let token = codec.issue(&identity).expect("issues");
        let decoded = codec.verify(&token).expect("verifies");
        assert_eq!(decoded, identity);
    }

    #[rstest]
    fn rejects_token_signed_with_other_secret() {
        let token = TokenCodec::new("other-secret", 60)
            .issue(&identity())
            .expect("issues");
        assert_eq!(codec().verify(&token), Err(TokenError::Invalid));
    }

    #[rstest]
    fn rejects_garbage_token() {
        assert_eq!(codec().verify("not-a-token"), Err(TokenError::Invalid));
    }

    #[rstest]
    fn rejects_expired_token() {
        // Negative TTL backdates the expiry past jsonwebtoken's default leeway.
        let codec = TokenCodec::new("test-secret", -2);
        let token = codec.issue(&identity()).expect("issues");
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }
}
