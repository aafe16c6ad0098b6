//! Cache module - in-memory section cache.
//!
//! Holds the last payload of every configuration section together with
//! when it was fetched. Freshness is a pure function of that timestamp,
//! the configured TTL and whether the entry has been invalidated.

mod config;
mod section_cache;

pub use config::CacheConfig;
pub use section_cache::SectionCache;
