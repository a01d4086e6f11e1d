//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client works with zero configuration
//! against the production API.

use std::path::PathBuf;
use std::time::Duration;

use community_shared::constants::{
    CACHE_MAX_AGE_HOURS, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, FEATURED_LIMIT,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, always ending in `/`.
    /// Env: `COMMUNITY_API_URL`
    /// Default: `https://api.community.app/v1/`
    pub api_url: String,

    /// Connect and read timeout for every request.
    /// Env: `COMMUNITY_TIMEOUT_SECS`
    /// Default: 30 seconds
    pub timeout: Duration,

    /// Page size requested by `refresh()`.
    /// Env: `COMMUNITY_PAGE_SIZE`
    /// Default: `20`
    pub page_size: u32,

    /// Number of items asked of the featured endpoint and kept in the
    /// cached fallback slice.
    /// Env: `COMMUNITY_FEATURED_LIMIT`
    /// Default: `5`
    pub featured_limit: u32,

    /// Age after which the sweep evicts cached rows.
    /// Env: `COMMUNITY_CACHE_MAX_AGE_HOURS`
    /// Default: 24 hours
    pub cache_max_age: chrono::Duration,

    /// Explicit database file.  `None` means the platform data directory.
    /// Env: `COMMUNITY_DB_PATH`
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            featured_limit: FEATURED_LIMIT,
            cache_max_age: chrono::Duration::hours(CACHE_MAX_AGE_HOURS),
            db_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("COMMUNITY_API_URL") {
            match normalize_base_url(&url) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %url, "Invalid COMMUNITY_API_URL, using default"),
            }
        }

        if let Some(secs) = parse_positive("COMMUNITY_TIMEOUT_SECS", &lookup) {
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(size) = parse_positive("COMMUNITY_PAGE_SIZE", &lookup) {
            config.page_size = size as u32;
        }

        if let Some(limit) = parse_positive("COMMUNITY_FEATURED_LIMIT", &lookup) {
            config.featured_limit = limit as u32;
        }

        if let Some(hours) = parse_positive("COMMUNITY_CACHE_MAX_AGE_HOURS", &lookup) {
            config.cache_max_age = chrono::Duration::hours(hours as i64);
        }

        if let Some(path) = lookup("COMMUNITY_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

fn parse_positive(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 && n <= u32::MAX as u64 => Some(n),
        _ => {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

/// Require an http(s) URL and make sure relative paths join under it.
fn normalize_base_url(raw: &str) -> Option<String> {
    let url = reqwest::Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let mut url = url.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Some(url)
}
