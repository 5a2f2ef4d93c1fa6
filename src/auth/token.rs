use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Lifetime of every issued token. There is no refresh; expiry is the only invalidation.
pub const TOKEN_VALIDITY_HOURS: i64 = 72;

/// Claims
///
/// Payload carried inside every identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the decimal id of the user the token was issued to.
    pub sub: String,
    /// Issued At, seconds since the epoch.
    pub iat: i64,
    /// Expiration Time, seconds since the epoch. Invalid at or after this instant.
    pub exp: i64,
}

/// TokenCodec
///
/// Signs and verifies HS256 identity tokens with a single process-wide secret.
/// The secret is injected once at construction and never mutated; clones share the
/// same derived keys and are cheap enough to hand to every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: TimeDelta,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec from the configured secret.
    ///
    /// # Errors
    /// `AuthError::Configuration` if the secret is empty.
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Configuration(
                "token signing secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity: TimeDelta::hours(TOKEN_VALIDITY_HOURS),
        })
    }

    /// Issues a token for `subject_id`, valid for 72 hours from now.
    pub fn issue(&self, subject_id: i64) -> Result<String, AuthError> {
        self.issue_at(subject_id, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, subject_id: i64, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            // HMAC signing only fails on a broken key, which `new` already rules out.
            tracing::error!(error = %e, "failed to sign identity token");
            AuthError::Configuration("unable to sign identity token".to_string())
        })
    }

    /// Verifies `token` against the current time and returns its subject id.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// Any failure (bad signature, malformed structure, wrong algorithm, expiry) collapses
    /// into `AuthError::InvalidToken`. Empty or garbage input is just another invalid token.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i64, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now` with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = ?e.kind(), "token rejected");
            AuthError::InvalidToken
        })?;

        let claims = token_data.claims;
        if now.timestamp() >= claims.exp {
            tracing::debug!(sub = %claims.sub, "token expired");
            return Err(AuthError::InvalidToken);
        }

        claims.sub.parse::<i64>().map_err(|_| {
            tracing::debug!(sub = %claims.sub, "token subject is not a numeric id");
            AuthError::InvalidToken
        })
    }
}
