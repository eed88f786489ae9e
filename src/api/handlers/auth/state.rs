//! Auth configuration and shared request state.

use secrecy::SecretString;
use std::sync::Arc;

use super::service::AuthSessionManager;
use super::tokens::{TokenConfig, TokenSigner};

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Process-wide auth configuration: the four token values plus cookie policy.
/// Read-only after start-up.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    access_token_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_secret: SecretString,
    refresh_token_ttl_seconds: i64,
    secure_cookies: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(access_token_secret: SecretString, refresh_token_secret: SecretString) -> Self {
        Self {
            access_token_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_secret,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(
            self.access_token_secret.clone(),
            self.refresh_token_secret.clone(),
        )
        .with_access_ttl_seconds(self.access_token_ttl_seconds)
        .with_refresh_ttl_seconds(self.refresh_token_ttl_seconds)
    }
}

/// Shared state handed to every auth handler.
pub struct AuthState {
    manager: AuthSessionManager,
    signer: Arc<TokenSigner>,
    config: AuthConfig,
}

impl AuthState {
    #[must_use]
    pub fn new(manager: AuthSessionManager, signer: Arc<TokenSigner>, config: AuthConfig) -> Self {
        Self {
            manager,
            signer,
            config,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &AuthSessionManager {
        &self.manager
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
