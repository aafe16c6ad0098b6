//! Cache configuration.

use std::time::Duration;

/// Default time-to-live for a cached section.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Configuration for the section cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a fetched section is served without going to the store.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl CacheConfig {
    /// Set time-to-live for cached sections.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = duration;
        self
    }

    /// Config with the TTL given in whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self::default().ttl(Duration::from_secs(secs))
    }
}
