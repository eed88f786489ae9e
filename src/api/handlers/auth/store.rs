//! Persistence boundaries for users and refresh sessions.
//!
//! The stores are deliberately narrow: sessions are created, looked up by
//! token, and marked superseded; nothing is ever hard-deleted. The session
//! store filters soft-deletion only — expiry policy lives in the session
//! manager, not in storage. That split is a contract, not an omission.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Server-side record tracking one live refresh token's validity window.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_digest: String,
}

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_digest: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (email or refresh token).
    #[error("duplicate record")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session for a freshly issued refresh token.
    async fn create(
        &self,
        refresh_token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthSession, StoreError>;

    /// Look up the non-deleted session holding this token, if any.
    ///
    /// Only soft-deletion is filtered here; callers must compare `expires_at`
    /// against their own clock.
    async fn find_active_by_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<AuthSession>, StoreError>;

    /// Mark a session superseded with a conditional write.
    ///
    /// Returns whether *this* call performed the transition. Exactly one of
    /// any number of concurrent callers observes `true`; the rest lost the
    /// race and must treat the session as gone.
    async fn mark_superseded(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}

/// Postgres-backed session store.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: &sqlx::postgres::PgRow) -> AuthSession {
    AuthSession {
        id: row.get("id"),
        refresh_token: row.get("refresh_token"),
        user_id: row.get("user_id"),
        expires_at: row.get("expires_at"),
        deleted: row.get("deleted"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(
        &self,
        refresh_token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthSession, StoreError> {
        let query = r"
            INSERT INTO auth_sessions (refresh_token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, refresh_token, user_id, expires_at, deleted, created_at, updated_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(refresh_token)
            .bind(user_id)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(row_to_session(&row)),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to insert session"),
            )),
        }
    }

    async fn find_active_by_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<AuthSession>, StoreError> {
        let query = r"
            SELECT id, refresh_token, user_id, expires_at, deleted, created_at, updated_at
            FROM auth_sessions
            WHERE refresh_token = $1
              AND deleted = false
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(refresh_token)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session by token")?;

        Ok(row.map(|row| row_to_session(&row)))
    }

    async fn mark_superseded(&self, id: Uuid) -> Result<bool, StoreError> {
        // The deleted = false guard makes this a claim: concurrent callers
        // racing on the same session see exactly one row affected in total.
        let query = r"
            UPDATE auth_sessions
            SET deleted = true,
                updated_at = NOW()
            WHERE id = $1
              AND deleted = false
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to mark session superseded")?;

        Ok(result.rows_affected() == 1)
    }
}

/// Postgres-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = r"
            SELECT id, email, password_digest
            FROM users
            WHERE email = $1
              AND deleted = false
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            email: row.get("email"),
            password_digest: row.get("password_digest"),
        }))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = r"
            INSERT INTO users (email, password_digest)
            VALUES ($1, $2)
            RETURNING id, email, password_digest
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.password_digest)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(UserRecord {
                id: row.get("id"),
                email: row.get("email"),
                password_digest: row.get("password_digest"),
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to insert user"),
            )),
        }
    }
}

/// In-memory session store.
///
/// The single mutex makes find/claim/create linearizable, which is the same
/// guarantee the conditional UPDATE gives the Postgres adapter.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: tokio::sync::Mutex<Vec<AuthSession>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, including superseded ones. Test visibility.
    pub async fn all(&self) -> Vec<AuthSession> {
        self.sessions.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        refresh_token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthSession, StoreError> {
        let mut sessions = self.sessions.lock().await;
        if sessions
            .iter()
            .any(|session| session.refresh_token == refresh_token)
        {
            return Err(StoreError::Duplicate);
        }
        let now = Utc::now();
        let session = AuthSession {
            id: Uuid::new_v4(),
            refresh_token: refresh_token.to_string(),
            user_id,
            expires_at,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_active_by_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<AuthSession>, StoreError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .iter()
            .find(|session| session.refresh_token == refresh_token && !session.deleted)
            .cloned())
    }

    async fn mark_superseded(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions
            .iter_mut()
            .find(|session| session.id == id && !session.deleted)
        else {
            return Ok(false);
        };
        session.deleted = true;
        session.updated_at = Utc::now();
        Ok(true)
    }
}

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: tokio::sync::Mutex<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_digest: user.password_digest,
        };
        users.push(record.clone());
        Ok(record)
    }
}
