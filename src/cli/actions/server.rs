use crate::api;
use crate::api::handlers::auth::AuthConfig;
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub access_token_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_secret: String,
    pub refresh_token_ttl_seconds: i64,
    pub secure_cookies: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = Url::parse(&args.dsn).context("invalid database DSN")?;

    let auth_config = AuthConfig::new(
        SecretString::from(args.access_token_secret),
        SecretString::from(args.refresh_token_secret),
    )
    .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
    .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds)
    .with_secure_cookies(args.secure_cookies);

    api::new(args.port, dsn.to_string(), auth_config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_debug_does_not_panic() {
        let args = Args {
            port: 8080,
            dsn: "postgres://localhost/sesio".to_string(),
            access_token_secret: "a".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_secret: "r".to_string(),
            refresh_token_ttl_seconds: 604_800,
            secure_cookies: false,
        };
        let rendered = format!("{args:?}");
        assert!(rendered.contains("8080"));
    }

    #[tokio::test]
    async fn execute_rejects_invalid_dsn() {
        let args = Args {
            port: 8080,
            dsn: "not a dsn".to_string(),
            access_token_secret: "a".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_secret: "r".to_string(),
            refresh_token_ttl_seconds: 604_800,
            secure_cookies: false,
        };
        let result = execute(args).await;
        assert!(result.is_err());
    }
}
