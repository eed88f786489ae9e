//! Token secret and TTL arguments — the four independent configuration
//! values behind token issuance.

use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_ACCESS_TOKEN_SECRET: &str = "access-token-secret";
pub const ARG_ACCESS_TOKEN_TTL_SECONDS: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TOKEN_SECRET: &str = "refresh-token-secret";
pub const ARG_REFRESH_TOKEN_TTL_SECONDS: &str = "refresh-token-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_SECRET)
                .long(ARG_ACCESS_TOKEN_SECRET)
                .help("Signing secret for access tokens")
                .env("SESIO_ACCESS_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL_SECONDS)
                .long(ARG_ACCESS_TOKEN_TTL_SECONDS)
                .help("Access token time-to-live in seconds")
                .env("SESIO_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_SECRET)
                .long(ARG_REFRESH_TOKEN_SECRET)
                .help("Signing secret for refresh tokens")
                .env("SESIO_REFRESH_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL_SECONDS)
                .long(ARG_REFRESH_TOKEN_TTL_SECONDS)
                .help("Refresh token time-to-live in seconds")
                .env("SESIO_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub access_token_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_secret: String,
    pub refresh_token_ttl_seconds: i64,
}

impl Options {
    /// Extract the token options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let access_token_secret = matches
            .get_one::<String>(ARG_ACCESS_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --access-token-secret")?;
        let refresh_token_secret = matches
            .get_one::<String>(ARG_REFRESH_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --refresh-token-secret")?;
        let access_token_ttl_seconds = matches
            .get_one::<i64>(ARG_ACCESS_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(900);
        let refresh_token_ttl_seconds = matches
            .get_one::<i64>(ARG_REFRESH_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(604_800);

        Ok(Self {
            access_token_secret,
            access_token_ttl_seconds,
            refresh_token_secret,
            refresh_token_ttl_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn parse_reads_all_four_values() -> Result<()> {
        let matches = command().get_matches_from(vec![
            "test",
            "--access-token-secret",
            "a",
            "--access-token-ttl-seconds",
            "60",
            "--refresh-token-secret",
            "r",
            "--refresh-token-ttl-seconds",
            "600",
        ]);

        let options = Options::parse(&matches)?;
        assert_eq!(options.access_token_secret, "a");
        assert_eq!(options.access_token_ttl_seconds, 60);
        assert_eq!(options.refresh_token_secret, "r");
        assert_eq!(options.refresh_token_ttl_seconds, 600);
        Ok(())
    }

    #[test]
    fn ttls_default_when_omitted() -> Result<()> {
        let matches = command().get_matches_from(vec![
            "test",
            "--access-token-secret",
            "a",
            "--refresh-token-secret",
            "r",
        ]);

        let options = Options::parse(&matches)?;
        assert_eq!(options.access_token_ttl_seconds, 900);
        assert_eq!(options.refresh_token_ttl_seconds, 604_800);
        Ok(())
    }

    #[test]
    fn secrets_are_required() {
        let result = command().try_get_matches_from(vec!["test"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = command().try_get_matches_from(vec![
            "test",
            "--access-token-secret",
            "a",
            "--refresh-token-secret",
            "r",
            "--access-token-ttl-seconds",
            "0",
        ]);
        assert!(result.is_err());
    }
}
