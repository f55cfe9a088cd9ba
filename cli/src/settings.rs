//! Connection settings shared by every subcommand.
//!
//! Values come from flags, falling back to the environment. `.env` is loaded
//! into the environment before parsing, so the usual setup is a `.env` with
//! `BOT_API_KEY`, `BOT_SECRET` and optionally `API_BASE_URL`.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use zenzap_core::{ClientConfig, Credentials, ZenzapClient, DEFAULT_BASE_URL};

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Bot API key (Bearer token).
    #[arg(long, env = "BOT_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Bot secret used for HMAC request signatures.
    #[arg(long, env = "BOT_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,

    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", env = "API_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn client(&self) -> Result<ZenzapClient> {
        let (Some(api_key), Some(secret)) = (non_blank(&self.api_key), non_blank(&self.secret))
        else {
            bail!("BOT_API_KEY and BOT_SECRET must be set (flags, environment or .env)");
        };
        let config = ClientConfig::default()
            .base_url(self.base_url.as_str())
            .timeout(Duration::from_secs(self.timeout_secs));
        Ok(ZenzapClient::with_config(
            Credentials::new(api_key, secret),
            config,
        ))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Splits a comma-separated id list, dropping blank entries.
pub fn parse_member_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_key: Option<&str>, secret: Option<&str>) -> ConnectionArgs {
        ConnectionArgs {
            api_key: api_key.map(str::to_string),
            secret: secret.map(str::to_string),
            base_url: "http://localhost:3000/".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn member_ids_drop_blanks() {
        assert_eq!(parse_member_ids(" a, ,b,,c "), vec!["a", "b", "c"]);
        assert!(parse_member_ids("").is_empty());
    }

    #[test]
    fn client_requires_both_credentials() {
        assert!(args(Some("key"), None).client().is_err());
        assert!(args(Some("  "), Some("secret")).client().is_err());
    }

    #[test]
    fn client_uses_configured_endpoint() {
        let client = args(Some("key"), Some("secret")).client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn credentials_pass_through_untrimmed() {
        let client = args(Some(" key "), Some("secret")).client().unwrap();
        let req = client.build_get_current_member();
        assert_eq!(req.header("Authorization"), Some("Bearer  key "));
    }
}
