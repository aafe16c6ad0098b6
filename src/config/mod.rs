//! Configuration module for storefront-sync.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::CacheConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// How long a loaded section is served from memory.
    pub cache_ttl: Duration,

    /// How often the host loop reloads stale sections.
    pub refresh_interval: Duration,

    /// Optional JSON file read when the remote store is unreachable at
    /// startup.
    pub fallback_store_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns error if `MONGODB_URI` is not set or a numeric variable
    /// cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let fallback_store_path = env::var("FALLBACK_STORE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            mongodb_uri: env::var("MONGODB_URI").context("MONGODB_URI must be set")?,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "storefront".to_string()),
            cache_ttl: secs_var("CONFIG_CACHE_TTL_SECS", 300)?,
            refresh_interval: secs_var("CONFIG_REFRESH_INTERVAL_SECS", 60)?,
            fallback_store_path,
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default().ttl(self.cache_ttl)
    }
}

/// Read a whole number of seconds, falling back to `default` when unset.
fn secs_var(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => parse_secs(name, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds, got {raw:?}"))?;

    anyhow::ensure!(secs > 0, "{name} must be greater than zero");
    Ok(Duration::from_secs(secs))
}
