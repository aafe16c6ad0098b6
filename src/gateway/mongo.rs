//! MongoDB-backed gateway.

use async_trait::async_trait;

use super::{ConfigGateway, GatewayError};
use crate::database::models::{Category, SiteInfo, SitePatch, Theme, ThemePatch};
use crate::database::{AppearanceRepository, Database, MenuRepository, SiteRepository};
use crate::sync::{Section, SectionPayload, SectionUpdate};

/// Gateway over the site, appearance and menu repositories.
pub struct MongoConfigGateway {
    site: SiteRepository,
    appearance: AppearanceRepository,
    menu: MenuRepository,
}

impl MongoConfigGateway {
    pub fn new(db: &Database) -> Self {
        Self {
            site: SiteRepository::new(db),
            appearance: AppearanceRepository::new(db),
            menu: MenuRepository::new(db),
        }
    }

    pub async fn get_site_section(&self) -> Result<Option<SiteInfo>, GatewayError> {
        self.site
            .get()
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Site, e))
    }

    pub async fn save_site_section(&self, patch: &SitePatch) -> Result<SiteInfo, GatewayError> {
        self.site
            .save(patch)
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Site, e))?
            .ok_or_else(|| missing_after_upsert(Section::Site))
    }

    pub async fn get_appearance_section(&self) -> Result<Option<Theme>, GatewayError> {
        self.appearance
            .get()
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Appearance, e))
    }

    pub async fn save_appearance_section(&self, patch: &ThemePatch) -> Result<Theme, GatewayError> {
        self.appearance
            .save(patch)
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Appearance, e))?
            .ok_or_else(|| missing_after_upsert(Section::Appearance))
    }

    pub async fn get_menu_section(&self) -> Result<Vec<Category>, GatewayError> {
        self.menu
            .get()
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Menu, e))
    }

    pub async fn save_menu_section(&self, menu: &[Category]) -> Result<(), GatewayError> {
        self.menu
            .save(menu)
            .await
            .map_err(|e| GatewayError::from_mongo(Section::Menu, e))
    }
}

fn missing_after_upsert(section: Section) -> GatewayError {
    GatewayError::StoreUnavailable(format!("{section} upsert returned no document"))
}

#[async_trait]
impl ConfigGateway for MongoConfigGateway {
    async fn get(&self, section: Section) -> Result<Option<SectionPayload>, GatewayError> {
        let payload = match section {
            Section::Site => self.get_site_section().await?.map(SectionPayload::Site),
            Section::Appearance => self
                .get_appearance_section()
                .await?
                .map(SectionPayload::Appearance),
            // An empty catalog is a real value, not a missing row
            Section::Menu => Some(SectionPayload::Menu(self.get_menu_section().await?)),
        };

        Ok(payload)
    }

    async fn save(&self, update: &SectionUpdate) -> Result<SectionPayload, GatewayError> {
        match update {
            SectionUpdate::Site(patch) => {
                Ok(SectionPayload::Site(self.save_site_section(patch).await?))
            }
            SectionUpdate::Appearance(patch) => Ok(SectionPayload::Appearance(
                self.save_appearance_section(patch).await?,
            )),
            SectionUpdate::Menu(menu) => {
                self.save_menu_section(menu).await?;
                Ok(SectionPayload::Menu(menu.clone()))
            }
        }
    }
}
