//! Bearer token issue and validation (HMAC-signed JWT).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// HMAC family accepted in the token header. Anything else is rejected.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Identity assertion carried by a token. A snapshot taken at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing key is empty")]
    EmptySecret,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("token has expired")]
    Expired,
    #[error("token issuer is not accepted")]
    InvalidIssuer,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnexpectedAlgorithm
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Malformed,
        }
    }
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    issuer: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            ttl,
        }
    }

    /// Issue a token for a user with the configured lifetime.
    pub fn issue(&self, user_id: i64, email: &str, role: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, email, role, self.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
            iss: self.issuer.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;
        debug!(user_id, "token issued");
        Ok(token)
    }

    /// Verify signature, algorithm, issuer and expiry, returning the claims as issued.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        // Expiry is exclusive: a token whose exp equals now is already dead.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        data.claims.user_id()?;
        Ok(data.claims)
    }

    /// Id of the token's subject, if the token verifies.
    pub fn extract_user_id(&self, token: &str) -> Result<i64, TokenError> {
        self.verify(token)?.user_id()
    }

    /// True when the token fails verification for any reason, expiry included.
    pub fn is_expired(&self, token: &str) -> bool {
        self.verify(token).is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "user-api";

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret, ISSUER, Duration::from_secs(3600))
    }

    #[test]
    fn issue_and_verify_roundtrip_keeps_claims() {
        let codec = codec("test-secret");
        let token = codec.issue(42, "a@x.com", "admin").unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(codec.extract_user_id(&token).unwrap(), 42);
    }

    #[test]
    fn zero_ttl_token_is_expired() {
        let codec = codec("test-secret");
        let token = codec
            .issue_with_ttl(1, "a@x.com", "user", Duration::ZERO)
            .unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
        assert!(codec.is_expired(&token));
    }

    #[test]
    fn past_expiry_is_rejected() {
        let codec = codec("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            email: "a@x.com".to_string(),
            role: "user".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            iss: ISSUER.to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn different_secret_is_rejected() {
        let token = codec("secret-one").issue(1, "a@x.com", "user").unwrap();
        assert_eq!(
            codec("secret-two").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn larger_hmac_variants_are_accepted() {
        let codec = codec("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "5".to_string(),
            email: "a@x.com".to_string(),
            role: "user".to_string(),
            iat: now,
            exp: now + 600,
            iss: ISSUER.to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(codec.verify(&token).unwrap(), claims);
    }

    #[test]
    fn non_hmac_header_is_rejected() {
        let codec = codec("test-secret");
        let token = codec.issue(1, "a@x.com", "user").unwrap();
        // Swap the header for one claiming RS256 while keeping the payload and signature.
        let mut parts = token.splitn(3, '.');
        let _header = parts.next().unwrap();
        let payload = parts.next().unwrap();
        let signature = parts.next().unwrap();
        let forged_header = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9"; // {"typ":"JWT","alg":"RS256"}
        let forged = format!("{}.{}.{}", forged_header, payload, signature);
        assert_eq!(codec.verify(&forged), Err(TokenError::UnexpectedAlgorithm));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = TokenCodec::new("test-secret", "someone-else", Duration::from_secs(60));
        let token = other.issue(1, "a@x.com", "user").unwrap();
        assert_eq!(codec("test-secret").verify(&token), Err(TokenError::InvalidIssuer));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("test-secret");
        assert_eq!(codec.verify("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let codec = codec("");
        assert_eq!(
            codec.issue(1, "a@x.com", "user"),
            Err(TokenError::EmptySecret)
        );
    }
}
