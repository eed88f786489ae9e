//! # Sesio (Authentication Session Manager)
//!
//! `sesio` issues short-lived access tokens and longer-lived refresh tokens,
//! persists refresh-session state, rotates refresh tokens on use, and verifies
//! inbound requests against a signed token.
//!
//! ## Token Model
//!
//! Every successful registration, login, or refresh produces a **token pair**:
//! an access token and a refresh token, signed with independent secrets and
//! independent time-to-live values. The refresh token is additionally tracked
//! server-side as an `auth_sessions` row, which is the source of truth for its
//! liveness.
//!
//! ## Rotation
//!
//! Refresh tokens are single-use. Consuming one marks its session superseded
//! (soft-deletion, never a hard delete) and issues a replacement pair in one
//! logical step. Concurrent refresh calls racing on the same token are
//! resolved by a conditional write: exactly one caller wins the rotation, the
//! other observes the session as gone.
//!
//! ## Failure Discipline
//!
//! Unknown email, wrong password, missing session, and expired tokens are all
//! presented to callers as the same generic unauthorized outcome. The precise
//! reason only reaches the server-side logs.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
