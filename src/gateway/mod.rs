//! Remote configuration gateway.
//!
//! Per-section read/write access to the remote configuration store.
//! The engine only sees the `ConfigGateway` trait; `MongoConfigGateway`
//! is the production implementation.

mod error;
mod mongo;

use async_trait::async_trait;

use crate::sync::{Section, SectionPayload, SectionUpdate};

pub use error::GatewayError;
pub use mongo::MongoConfigGateway;

/// Read/write access to configuration sections.
#[async_trait]
pub trait ConfigGateway: Send + Sync {
    /// Read a section.
    ///
    /// `Ok(None)` means the store holds no row for it yet, which is not
    /// an error.
    async fn get(&self, section: Section) -> Result<Option<SectionPayload>, GatewayError>;

    /// Upsert a section and return its full stored value.
    ///
    /// Partial updates keep every field they do not mention.
    async fn save(&self, update: &SectionUpdate) -> Result<SectionPayload, GatewayError>;
}
