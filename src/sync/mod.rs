//! Configuration synchronization.
//!
//! ## Architecture
//!
//! - `Section` / `SectionPayload` / `SectionUpdate` - the three config slices
//! - `ConfigurationSnapshot` - merged view handed to consumers
//! - `merger` - the single place that folds a payload into a snapshot
//! - `SyncEngine` - cache-or-fetch decisions, single-flight loads, saves
//! - `BootstrapLoader` - concurrent cold start with local fallback

mod bootstrap;
mod engine;
mod error;
pub mod merger;
mod section;
mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{BootstrapLoader, BootstrapReport};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use section::{Section, SectionLoadStatus, SectionPayload, SectionState, SectionUpdate};
pub use snapshot::{ConfigurationSnapshot, Slot};
