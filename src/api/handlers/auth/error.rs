//! Error taxonomy for the authentication flows.
//!
//! Callers match on the variant, never on message text. The HTTP mapping
//! collapses every authentication failure to the same generic unauthorized
//! response; the precise reason only reaches the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately one variant for both.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists")]
    DuplicateUser,
    /// No non-deleted session holds the presented refresh token. Superseded
    /// and never-issued tokens are indistinguishable to the caller.
    #[error("no active session found")]
    NoActiveSession,
    /// The stored session's expiry is in the past, regardless of what the
    /// token's own signature says.
    #[error("refresh token expired")]
    RefreshTokenExpired,
    /// Rotation consumed the old session but could not persist the new one.
    #[error("failed to refresh tokens")]
    RefreshFailed(#[source] anyhow::Error),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable machine-readable kind, used in logs and tests.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::DuplicateUser => "duplicate_user",
            Self::NoActiveSession => "no_active_session",
            Self::RefreshTokenExpired => "refresh_token_expired",
            Self::RefreshFailed(_) => "refresh_failed",
            Self::Unauthenticated => "unauthenticated",
            Self::Internal(_) => "internal",
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::NoActiveSession
            | Self::RefreshTokenExpired
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::DuplicateUser => StatusCode::CONFLICT,
            Self::RefreshFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::RefreshFailed(source) | Self::Internal(source) => {
                error!(kind = self.kind(), "authentication failure: {source:#}");
            }
            other => {
                warn!(kind = other.kind(), "authentication failure");
            }
        }

        let status = self.status();
        let body = match status {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::CONFLICT => "Conflict",
            _ => "Internal Server Error",
        };
        (status, body.to_string()).into_response()
    }
}
