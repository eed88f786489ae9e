//! The authentication session manager: registration, login, and refresh.
//!
//! A refresh token passes through `issued -> active -> consumed | expired`;
//! there is no way back to `active`. Rotation is the delicate piece: the old
//! session must be claimed before the replacement exists, so a presented token
//! can never be redeemed twice, even under concurrent retries.

use std::sync::Arc;

use super::clock::Clock;
use super::error::AuthError;
use super::password;
use super::store::{NewUser, SessionStore, StoreError, UserRecord, UserStore};
use super::tokens::{TokenPair, TokenPayload, TokenSigner};

pub struct AuthSessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    signer: Arc<TokenSigner>,
    clock: Arc<dyn Clock>,
}

impl AuthSessionManager {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        signer: Arc<TokenSigner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            signer,
            clock,
        }
    }

    /// Create an account and issue its first token pair.
    ///
    /// # Errors
    ///
    /// `DuplicateUser` when the email is taken (checked up front, and again
    /// via the unique index for writers racing on the same email);
    /// `Internal` on collaborator failure.
    pub async fn register(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(backend_error)?;
        if existing.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let digest = password::hash(password)?;
        let user = match self
            .users
            .create(NewUser {
                email: email.to_string(),
                password_digest: digest,
            })
            .await
        {
            Ok(user) => user,
            Err(StoreError::Duplicate) => return Err(AuthError::DuplicateUser),
            Err(StoreError::Backend(source)) => return Err(AuthError::Internal(source)),
        };

        self.issue_session(&user).await
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    ///
    /// Unknown email and wrong password both fail `InvalidCredentials`, so
    /// responses cannot be used to probe for accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(backend_error)?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::matches(password, &user.password_digest) {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(&user).await
    }

    /// Consume a refresh token and issue a replacement pair.
    ///
    /// The caller identifies the account by `email` — the identifier the
    /// user-lookup collaborator expects — while the session itself is located
    /// by the presented token.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown account, `NoActiveSession` when no
    /// live session holds the token (never issued, already superseded, or
    /// lost a concurrent race), `RefreshTokenExpired` when the stored expiry
    /// is past, and `RefreshFailed` when the replacement session cannot be
    /// persisted after the old one was consumed.
    pub async fn refresh(
        &self,
        email: &str,
        presented_refresh_token: &str,
    ) -> Result<TokenPair, AuthError> {
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(backend_error)?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(session) = self
            .sessions
            .find_active_by_token(presented_refresh_token)
            .await
            .map_err(backend_error)?
        else {
            return Err(AuthError::NoActiveSession);
        };

        // The stored record is the source of truth for liveness; this check is
        // independent of the token's own signature and embedded claim.
        if session.expires_at <= self.clock.now() {
            return Err(AuthError::RefreshTokenExpired);
        }

        // Claim the session before anything else. Of concurrent callers racing
        // on one token, exactly one gets `true` here.
        let claimed = self
            .sessions
            .mark_superseded(session.id)
            .await
            .map_err(backend_error)?;
        if !claimed {
            return Err(AuthError::NoActiveSession);
        }

        let payload = TokenPayload {
            user_id: user.id,
            email: user.email.clone(),
        };
        let pair = self
            .signer
            .issue_pair(&payload)
            .map_err(|err| AuthError::RefreshFailed(err.into()))?;

        // If this insert fails the old session stays dead: forcing a re-login
        // is the acceptable cost, a replayable token is not.
        match self
            .sessions
            .create(&pair.refresh_token, user.id, pair.refresh_token_expires_at)
            .await
        {
            Ok(_) => Ok(pair),
            Err(err) => Err(AuthError::RefreshFailed(err.into())),
        }
    }

    async fn issue_session(&self, user: &UserRecord) -> Result<TokenPair, AuthError> {
        let payload = TokenPayload {
            user_id: user.id,
            email: user.email.clone(),
        };
        let pair = self
            .signer
            .issue_pair(&payload)
            .map_err(|err| AuthError::Internal(err.into()))?;

        self.sessions
            .create(&pair.refresh_token, user.id, pair.refresh_token_expires_at)
            .await
            .map_err(|err| AuthError::Internal(err.into()))?;

        Ok(pair)
    }
}

fn backend_error(err: StoreError) -> AuthError {
    AuthError::Internal(err.into())
}
