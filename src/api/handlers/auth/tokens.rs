//! Signing and verification of access and refresh tokens.
//!
//! Both token classes are compact HS256 JWTs carrying the same payload
//! (`user_id`, `email`) but signed with independent secrets and independent
//! time-to-live values. Configuration and the clock are explicit fields of
//! [`TokenSigner`]; nothing is captured in hidden state.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::clock::Clock;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Which of the two token families a token belongs to.
///
/// Each class selects its own secret and TTL; a token of one class never
/// verifies against the other class's secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Secrets and TTLs for both token classes, read-only after start-up.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    access_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_secret: SecretString,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(access_secret: SecretString, refresh_secret: SecretString) -> Self {
        Self {
            access_secret,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_secret,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

/// The claims embedded in every signed token. Round-trips exactly through
/// sign/verify.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    user_id: Uuid,
    email: String,
    iat: i64,
    exp: i64,
}

/// A freshly signed token together with its expiry, read back out of the
/// token's own `exp` claim.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// An access/refresh token pair produced from one payload.
///
/// The two tokens are issued independently and share no nonce; the only thing
/// they have in common is the payload.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub struct TokenSigner {
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    #[must_use]
    pub fn new(config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn secret(&self, class: TokenClass) -> &SecretString {
        match class {
            TokenClass::Access => &self.config.access_secret,
            TokenClass::Refresh => &self.config.refresh_secret,
        }
    }

    fn ttl_seconds(&self, class: TokenClass) -> i64 {
        match class {
            TokenClass::Access => self.config.access_ttl_seconds,
            TokenClass::Refresh => self.config.refresh_ttl_seconds,
        }
    }

    /// Sign a token of the given class.
    ///
    /// The returned expiry is derived by decoding the signed token's embedded
    /// `exp` claim, so it is exactly the timestamp verification will later see.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or the freshly signed token cannot be
    /// decoded back.
    pub fn issue(&self, payload: &TokenPayload, class: TokenClass) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now().timestamp();
        let claims = Claims {
            user_id: payload.user_id,
            email: payload.email.clone(),
            iat: now,
            exp: now + self.ttl_seconds(class),
        };

        let key = EncodingKey::from_secret(self.secret(class).expose_secret().as_bytes());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(TokenError::Signing)?;

        let embedded = self.decode(&token, class)?;
        let expires_at =
            DateTime::from_timestamp(embedded.exp, 0).ok_or(TokenError::InvalidToken)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token against the given class's secret and the injected clock.
    ///
    /// # Errors
    ///
    /// `InvalidToken` for a bad signature or malformed token, `ExpiredToken`
    /// when the embedded expiry is in the past. Callers that face the network
    /// must collapse both to the same unauthorized outcome.
    pub fn verify(&self, token: &str, class: TokenClass) -> Result<TokenPayload, TokenError> {
        let claims = self.decode(token, class)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::ExpiredToken);
        }
        Ok(TokenPayload {
            user_id: claims.user_id,
            email: claims.email,
        })
    }

    /// Issue an access/refresh pair from one payload.
    ///
    /// # Errors
    ///
    /// Returns an error if either class fails to sign.
    pub fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, TokenError> {
        let access = self.issue(payload, TokenClass::Access)?;
        let refresh = self.issue(payload, TokenClass::Refresh)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_token_expires_at: access.expires_at,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    // Expiry is validated by `verify` against the injected clock, so the
    // library's own system-time check is disabled here.
    fn decode(&self, token: &str, class: TokenClass) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let key = DecodingKey::from_secret(self.secret(class).expose_secret().as_bytes());
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }
}
