//! Persistent local key-value store used as a read-only startup fallback.
//!
//! Consulted only when a section cannot be loaded from the remote store
//! during bootstrap. Nothing in this crate ever writes to it.

mod json_file;

use async_trait::async_trait;

use crate::sync::{Section, SectionPayload};

pub use json_file::JsonFileStore;

/// Read-only access to locally persisted section payloads.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the last persisted value of `section`, if any.
    async fn read(&self, section: Section) -> anyhow::Result<Option<SectionPayload>>;
}
