//! storefront-sync - configuration synchronization for a restaurant storefront.
//!
//! Keeps the site info, theme and menu of the storefront cached in memory
//! and in sync with the remote configuration store.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB models and per-section repositories
//! - `gateway` - Remote configuration gateway over the repositories
//! - `cache` - Per-section cache with TTL and invalidation
//! - `sync` - Snapshot merging, the sync engine and bootstrap
//! - `events` - Save notifications for independent consumers
//! - `fallback` - Read-only local store used when the remote is down

pub mod cache;
pub mod config;
pub mod database;
pub mod events;
pub mod fallback;
pub mod gateway;
pub mod sync;
