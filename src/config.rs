use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7251/api";
pub const DEFAULT_PROXY_PREFIX: &str = "/api/backend";
pub const DEFAULT_MEDIA_PREFIX: &str = "/admin/media";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API root, one trailing slash removed.
    pub api_base_url: String,
    pub proxy_prefix: String,
    pub media_prefix: String,
    /// Accept self-signed upstream certificates. Development only.
    pub allow_insecure_upstream_tls: bool,
    pub data_dir: PathBuf,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub api_client_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_base = get("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&raw_base).with_context(|| format!("API_BASE_URL is not a valid url: {raw_base}"))?;
        let api_base_url = trim_trailing_slash(&raw_base).to_string();

        let proxy_prefix = normalize_prefix(
            &get("PROXY_PREFIX").unwrap_or_else(|| DEFAULT_PROXY_PREFIX.to_string()),
        )
        .context("PROXY_PREFIX must not be the root path")?;
        let media_prefix = normalize_prefix(
            &get("MEDIA_PREFIX").unwrap_or_else(|| DEFAULT_MEDIA_PREFIX.to_string()),
        )
        .context("MEDIA_PREFIX must not be the root path")?;
        if proxy_prefix == media_prefix {
            bail!("PROXY_PREFIX and MEDIA_PREFIX must differ");
        }

        let allow_insecure_upstream_tls = match get("ALLOW_INSECURE_UPSTREAM_TLS") {
            Some(v) => parse_bool(&v).context("ALLOW_INSECURE_UPSTREAM_TLS must be a boolean")?,
            None => false,
        };

        let data_dir = PathBuf::from(get("PORTFOLIO_DATA_DIR").unwrap_or_else(|| "data".to_string()));

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().context("PORT must be a valid port number")?,
            None => 8080,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let timeout_secs = match get("API_CLIENT_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("API_CLIENT_TIMEOUT_SECS must be a whole number of seconds")?,
            None => 15,
        };

        Ok(Self {
            api_base_url,
            proxy_prefix,
            media_prefix,
            allow_insecure_upstream_tls,
            data_dir,
            port,
            allowed_origins,
            api_client_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub fn trim_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// "/api/backend/" and "api/backend" both become "/api/backend".
fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("/{trimmed}"))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized boolean: {other}"),
    }
}
