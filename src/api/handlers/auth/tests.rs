//! End-to-end tests for the auth module over the in-memory stores.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use secrecy::SecretString;

use super::clock::Clock;
use super::clock::test::{ManualClock, epoch};
use super::error::AuthError;
use super::principal::require_auth;
use super::service::AuthSessionManager;
use super::store::{InMemorySessionStore, InMemoryUserStore, SessionStore};
use super::tokens::{TokenConfig, TokenSigner};

const ACCESS_TTL_SECONDS: i64 = 900;
const REFRESH_TTL_SECONDS: i64 = 3600;

struct TestAuth {
    manager: AuthSessionManager,
    signer: Arc<TokenSigner>,
    sessions: Arc<InMemorySessionStore>,
    clock: Arc<ManualClock>,
}

fn test_auth() -> TestAuth {
    let clock = Arc::new(ManualClock::new(epoch()));
    let config = TokenConfig::new(
        SecretString::from("access-secret"),
        SecretString::from("refresh-secret"),
    )
    .with_access_ttl_seconds(ACCESS_TTL_SECONDS)
    .with_refresh_ttl_seconds(REFRESH_TTL_SECONDS);
    let signer = Arc::new(TokenSigner::new(config, clock.clone()));
    let sessions = Arc::new(InMemorySessionStore::new());
    let manager = AuthSessionManager::new(
        Arc::new(InMemoryUserStore::new()),
        sessions.clone(),
        signer.clone(),
        clock.clone(),
    );

    TestAuth {
        manager,
        signer,
        sessions,
        clock,
    }
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("ascii token"),
    );
    headers
}

#[tokio::test]
async fn register_issues_pair_and_active_session() -> Result<(), AuthError> {
    let auth = test_auth();

    let pair = auth.manager.register("a@x.com", "p1-p1-p1").await?;

    let now = auth.clock.now();
    assert!(pair.access_token_expires_at > now);
    assert!(pair.refresh_token_expires_at > now);

    let session = auth
        .sessions
        .find_active_by_token(&pair.refresh_token)
        .await
        .expect("store should answer")
        .expect("session should be persisted");
    assert!(!session.deleted);
    assert_eq!(session.expires_at, pair.refresh_token_expires_at);
    Ok(())
}

#[tokio::test]
async fn register_twice_is_duplicate_user() -> Result<(), AuthError> {
    let auth = test_auth();

    auth.manager.register("a@x.com", "p1-p1-p1").await?;
    let result = auth.manager.register("a@x.com", "other-pw").await;
    assert!(matches!(result, Err(AuthError::DuplicateUser)));
    Ok(())
}

#[tokio::test]
async fn login_then_authorize_round_trips_identity() -> Result<(), AuthError> {
    let auth = test_auth();

    auth.manager.register("a@x.com", "p1-p1-p1").await?;
    let pair = auth.manager.login("a@x.com", "p1-p1-p1").await?;

    let principal = require_auth(&bearer_headers(&pair.access_token), &auth.signer)?;
    assert_eq!(principal.email, "a@x.com");

    let session = auth
        .sessions
        .find_active_by_token(&pair.refresh_token)
        .await
        .expect("store should answer")
        .expect("login should persist a session");
    assert_eq!(session.user_id, principal.user_id);
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_alike() -> Result<(), AuthError> {
    let auth = test_auth();
    auth.manager.register("a@x.com", "p1-p1-p1").await?;

    let wrong_password = auth.manager.login("a@x.com", "wrong").await.unwrap_err();
    let unknown_email = auth.manager.login("b@x.com", "p1-p1-p1").await.unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_supersedes() -> Result<(), AuthError> {
    let auth = test_auth();
    let first = auth.manager.register("a@x.com", "p1-p1-p1").await?;

    auth.clock.advance_seconds(60);
    let second = auth.manager.refresh("a@x.com", &first.refresh_token).await?;

    assert_ne!(second.refresh_token, first.refresh_token);
    // Positive TTL from a later now: the replacement expires strictly later.
    assert!(second.refresh_token_expires_at > first.refresh_token_expires_at);

    let records = auth.sessions.all().await;
    assert_eq!(records.len(), 2);
    let old = records
        .iter()
        .find(|session| session.refresh_token == first.refresh_token)
        .expect("old session should still exist");
    assert!(old.deleted);
    let new = records
        .iter()
        .find(|session| session.refresh_token == second.refresh_token)
        .expect("new session should exist");
    assert!(!new.deleted);
    Ok(())
}

#[tokio::test]
async fn stale_refresh_token_is_rejected() -> Result<(), AuthError> {
    let auth = test_auth();
    let first = auth.manager.register("a@x.com", "p1-p1-p1").await?;

    auth.clock.advance_seconds(60);
    auth.manager.refresh("a@x.com", &first.refresh_token).await?;

    // Replaying the consumed token is indistinguishable from never owning one.
    let replay = auth.manager.refresh("a@x.com", &first.refresh_token).await;
    assert!(matches!(replay, Err(AuthError::NoActiveSession)));
    Ok(())
}

#[tokio::test]
async fn expired_session_beats_valid_signature() -> Result<(), AuthError> {
    let auth = test_auth();
    let pair = auth.manager.register("a@x.com", "p1-p1-p1").await?;

    // Past the stored expiry; the signature itself does not matter.
    auth.clock.advance_seconds(REFRESH_TTL_SECONDS + 1);

    let result = auth.manager.refresh("a@x.com", &pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::RefreshTokenExpired)));
    Ok(())
}

#[tokio::test]
async fn refresh_for_unknown_account_fails() -> Result<(), AuthError> {
    let auth = test_auth();
    let pair = auth.manager.register("a@x.com", "p1-p1-p1").await?;

    let result = auth.manager.refresh("b@x.com", &pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn never_issued_token_fails_refresh() -> Result<(), AuthError> {
    let auth = test_auth();
    auth.manager.register("a@x.com", "p1-p1-p1").await?;

    let result = auth.manager.refresh("a@x.com", "fabricated-token").await;
    assert!(matches!(result, Err(AuthError::NoActiveSession)));
    Ok(())
}

#[tokio::test]
async fn concurrent_refresh_has_exactly_one_winner() -> Result<(), AuthError> {
    let auth = test_auth();
    let pair = auth.manager.register("a@x.com", "p1-p1-p1").await?;
    auth.clock.advance_seconds(1);

    let (first, second) = tokio::join!(
        auth.manager.refresh("a@x.com", &pair.refresh_token),
        auth.manager.refresh("a@x.com", &pair.refresh_token),
    );

    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1, "exactly one refresh may win the rotation");

    let loser = outcomes
        .iter()
        .find(|result| result.is_err())
        .expect("one refresh must lose");
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        AuthError::NoActiveSession
    ));
    Ok(())
}

#[tokio::test]
async fn full_lifecycle_scenario() -> Result<(), AuthError> {
    let auth = test_auth();

    // Register: both expiries in the future, session active.
    let first = auth.manager.register("a@x.com", "p1-p1-p1").await?;
    assert!(first.access_token_expires_at > auth.clock.now());
    assert!(first.refresh_token_expires_at > auth.clock.now());
    assert!(auth
        .sessions
        .find_active_by_token(&first.refresh_token)
        .await
        .expect("store should answer")
        .is_some());

    // Refresh: new pair, distinct refresh token, old session superseded.
    auth.clock.advance_seconds(30);
    let second = auth.manager.refresh("a@x.com", &first.refresh_token).await?;
    assert_ne!(second.refresh_token, first.refresh_token);
    assert!(auth
        .sessions
        .find_active_by_token(&first.refresh_token)
        .await
        .expect("store should answer")
        .is_none());

    // Replay of the original token: no active session.
    let replay = auth.manager.refresh("a@x.com", &first.refresh_token).await;
    assert!(matches!(replay, Err(AuthError::NoActiveSession)));

    // The fresh access token still authorizes requests.
    let principal = require_auth(&bearer_headers(&second.access_token), &auth.signer)?;
    assert_eq!(principal.email, "a@x.com");
    Ok(())
}
