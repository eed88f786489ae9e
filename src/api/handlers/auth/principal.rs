//! Authenticated principal extraction for protected endpoints.
//!
//! Flow Overview: pull the access token out of the request (cookie field
//! first, then `Authorization: Bearer`), verify it against the access-class
//! secret, and hand the decoded identity to the handler. Every failure mode —
//! missing token, bad signature, malformed token, expired token — collapses to
//! the same `Unauthenticated` outcome.

use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};
use uuid::Uuid;

use super::error::AuthError;
use super::tokens::{TokenClass, TokenSigner};

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "sesio_access";

/// Authenticated user context derived from a verified access token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

/// Authorize a request from its headers.
///
/// # Errors
///
/// `Unauthenticated` for any missing or unverifiable token; callers never
/// learn which check failed.
pub fn require_auth(headers: &HeaderMap, signer: &TokenSigner) -> Result<Principal, AuthError> {
    let token = extract_access_token(headers).ok_or(AuthError::Unauthenticated)?;
    let payload = signer
        .verify(&token, TokenClass::Access)
        .map_err(|_| AuthError::Unauthenticated)?;

    Ok(Principal {
        user_id: payload.user_id,
        email: payload.email,
    })
}

fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie_token(headers) {
        return Some(token);
    }
    extract_bearer_token(headers)
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == ACCESS_TOKEN_COOKIE && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
