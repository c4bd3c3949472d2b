use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token verification failures. Both kinds surface as 401 at the HTTP
/// boundary, but expiry is kept distinct for logging.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Stateless HS256 token issuer and verifier.
///
/// Tokens carry only the user id; there is no revocation list, so a token
/// stays valid until `exp` even if the account disappears. `GET /me` handles
/// that case by returning 401 when the subject no longer exists.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Mint a token for `user_id`, expiring `ttl` from now.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Check signature and expiry, returning the embedded user id.
    ///
    /// Zero leeway: a token is expired the second `exp` passes.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::from_secs(3600))
    }

    #[test]
    fn issues_and_verifies_roundtrip() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), id);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let svc = service();
        let other = TokenService::new("different-secret", Duration::from_secs(3600));
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn rejects_garbage() {
        let svc = service();
        assert_eq!(svc.verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(svc.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn non_uuid_subject_is_invalid() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-42".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Invalid));
    }
}
