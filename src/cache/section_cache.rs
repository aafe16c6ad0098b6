//! Per-section cache with time-based expiry and explicit invalidation.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use super::CacheConfig;
use crate::sync::{Section, SectionPayload};

/// One cached section.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: SectionPayload,
    fetched_at: Instant,
    /// Set by `invalidate`, cleared by the next `write`.
    invalidated: Option<String>,
}

/// Cache of section payloads.
///
/// An entry is fresh while it is younger than the TTL and has not been
/// invalidated since it was written. Stale entries keep their payload so
/// callers can keep rendering it while a refetch runs.
#[derive(Debug)]
pub struct SectionCache {
    entries: DashMap<Section, CacheEntry>,
    ttl: Duration,
}

impl SectionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: config.ttl,
        }
    }

    /// Whether `section` can be served without a remote read.
    pub fn is_fresh(&self, section: Section) -> bool {
        self.entries
            .get(&section)
            .map(|entry| entry.invalidated.is_none() && entry.fetched_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    /// Last written payload, fresh or not.
    pub fn read(&self, section: Section) -> Option<SectionPayload> {
        self.entries.get(&section).map(|entry| entry.payload.clone())
    }

    /// Store `payload` for its section and mark it fresh.
    pub fn write(&self, payload: SectionPayload) {
        let section = payload.section();
        self.entries.insert(
            section,
            CacheEntry {
                payload,
                fetched_at: Instant::now(),
                invalidated: None,
            },
        );
        debug!("Cached {} section", section);
    }

    /// Store `payload` without making it fresh.
    pub fn write_stale(&self, payload: SectionPayload, reason: &str) {
        let section = payload.section();
        self.entries.insert(
            section,
            CacheEntry {
                payload,
                fetched_at: Instant::now(),
                invalidated: Some(reason.to_string()),
            },
        );
        debug!("Cached {} section as stale ({})", section, reason);
    }

    /// Mark `section` stale regardless of its age.
    ///
    /// Returns `false` if nothing was cached for it.
    pub fn invalidate(&self, section: Section, reason: &str) -> bool {
        match self.entries.get_mut(&section) {
            Some(mut entry) => {
                entry.invalidated = Some(reason.to_string());
                debug!("Invalidated {} section: {}", section, reason);
                true
            }
            None => false,
        }
    }

    /// Why `section` was last invalidated, if it is currently invalidated.
    pub fn invalidation_reason(&self, section: Section) -> Option<String> {
        self.entries
            .get(&section)
            .and_then(|entry| entry.invalidated.clone())
    }

    /// Time since `section` was last written.
    pub fn age(&self, section: Section) -> Option<Duration> {
        self.entries.get(&section).map(|entry| entry.fetched_at.elapsed())
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
