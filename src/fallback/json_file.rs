//! JSON file implementation of [`LocalStore`].

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::LocalStore;
use crate::database::models::{Category, SiteInfo, Theme};
use crate::sync::{Section, SectionPayload};

/// On-disk layout: one optional key per section.
#[derive(Debug, Default, Deserialize)]
struct FallbackDocument {
    #[serde(default)]
    site: Option<SiteInfo>,
    #[serde(default)]
    appearance: Option<Theme>,
    #[serde(default)]
    menu: Option<Vec<Category>>,
}

/// Local store backed by a JSON document such as
/// `{ "site": {...}, "appearance": {...}, "menu": [...] }`.
///
/// A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> anyhow::Result<FallbackDocument> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No fallback file at {}", self.path.display());
                return Ok(FallbackDocument::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("invalid fallback document {}", self.path.display()))
    }
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn read(&self, section: Section) -> anyhow::Result<Option<SectionPayload>> {
        let document = self.load().await?;

        Ok(match section {
            Section::Site => document.site.map(SectionPayload::Site),
            Section::Appearance => document.appearance.map(SectionPayload::Appearance),
            Section::Menu => document.menu.map(SectionPayload::Menu),
        })
    }
}
