//! Single-document settings repositories (site info, appearance).
//!
//! Each collection is read as its most recent document. Writes are
//! partial upserts on that same document so concurrent editors that own
//! different fields never clobber each other.

use mongodb::bson::{self, doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOneOptions, ReturnDocument};
use mongodb::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::database::models::{SiteInfo, Theme};
use crate::database::Database;

/// Repository for the site information document.
pub type SiteRepository = SettingsRepository<SiteInfo>;

/// Repository for the appearance (theme) document.
pub type AppearanceRepository = SettingsRepository<Theme>;

/// Repository for a collection holding one logical settings row.
pub struct SettingsRepository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
    name: &'static str,
}

impl SiteRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "site_settings")
    }
}

impl AppearanceRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "appearance_settings")
    }
}

impl<T> SettingsRepository<T>
where
    T: DeserializeOwned + Send + Sync,
{
    fn with_collection(db: &Database, name: &'static str) -> Self {
        Self {
            collection: db.collection(name),
            name,
        }
    }

    /// Get the most recent document, or `None` if nothing was provisioned.
    pub async fn get(&self) -> mongodb::error::Result<Option<T>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "updatedAt": -1 })
            .build();

        self.collection
            .find_one(doc! {})
            .with_options(options)
            .await
    }

    /// Upsert only the fields present in `patch` and return the stored row.
    ///
    /// `patch` must serialize `None` fields as absent so they are kept.
    pub async fn save<P>(&self, patch: &P) -> mongodb::error::Result<Option<T>>
    where
        P: Serialize,
    {
        let mut set: Document = bson::to_document(patch)?;
        set.insert("updatedAt", bson::DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .sort(doc! { "updatedAt": -1 })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let stored = self
            .collection
            .find_one_and_update(doc! {}, doc! { "$set": set })
            .with_options(options)
            .await?;

        debug!("Upserted {} document", self.name);
        Ok(stored)
    }
}
