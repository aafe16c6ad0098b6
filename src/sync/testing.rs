//! In-memory gateway for engine tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Section, SectionPayload, SectionUpdate};
use crate::database::models::{Category, SiteInfo, SitePatch, Theme, ThemePatch};
use crate::gateway::{ConfigGateway, GatewayError};

#[derive(Default)]
struct Rows {
    site: Option<SiteInfo>,
    theme: Option<Theme>,
    menu: Vec<Category>,
}

/// Gateway backed by plain values, with call counters and failure
/// injection. Partial saves follow the same keep-unspecified-fields rule
/// as the MongoDB gateway.
#[derive(Default)]
pub struct MemoryGateway {
    rows: Mutex<Rows>,
    gets: [AtomicUsize; 3],
    saves: [AtomicUsize; 3],
    failing_gets: Mutex<HashSet<Section>>,
    failing_saves: Mutex<HashSet<Section>>,
    panic_next_get: AtomicBool,
    get_delay: Duration,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, site: SiteInfo) -> Self {
        self.rows.lock().site = Some(site);
        self
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        self.rows.lock().theme = Some(theme);
        self
    }

    pub fn with_menu(self, menu: Vec<Category>) -> Self {
        self.rows.lock().menu = menu;
        self
    }

    /// Delay every read. The row is captured before the delay.
    pub fn with_get_delay(mut self, delay: Duration) -> Self {
        self.get_delay = delay;
        self
    }

    pub fn fail_get(&self, section: Section) {
        self.failing_gets.lock().insert(section);
    }

    pub fn fail_save(&self, section: Section) {
        self.failing_saves.lock().insert(section);
    }

    /// Panic inside the next read, as a buggy driver would.
    pub fn panic_next_get(&self) {
        self.panic_next_get.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self, section: Section) {
        self.failing_gets.lock().remove(&section);
        self.failing_saves.lock().remove(&section);
    }

    pub fn get_calls(&self, section: Section) -> usize {
        self.gets[section.index()].load(Ordering::SeqCst)
    }

    pub fn save_calls(&self, section: Section) -> usize {
        self.saves[section.index()].load(Ordering::SeqCst)
    }

    pub fn stored_site(&self) -> Option<SiteInfo> {
        self.rows.lock().site.clone()
    }

    pub fn stored_theme(&self) -> Option<Theme> {
        self.rows.lock().theme.clone()
    }

    fn injected(section: Section) -> GatewayError {
        GatewayError::StoreUnavailable(format!("injected {section} failure"))
    }
}

#[async_trait]
impl ConfigGateway for MemoryGateway {
    async fn get(&self, section: Section) -> Result<Option<SectionPayload>, GatewayError> {
        self.gets[section.index()].fetch_add(1, Ordering::SeqCst);

        if self.panic_next_get.swap(false, Ordering::SeqCst) {
            panic!("gateway panicked reading {section} section");
        }

        let result = if self.failing_gets.lock().contains(&section) {
            Err(Self::injected(section))
        } else {
            let rows = self.rows.lock();
            Ok(match section {
                Section::Site => rows.site.clone().map(SectionPayload::Site),
                Section::Appearance => rows.theme.clone().map(SectionPayload::Appearance),
                Section::Menu => Some(SectionPayload::Menu(rows.menu.clone())),
            })
        };

        if !self.get_delay.is_zero() {
            tokio::time::sleep(self.get_delay).await;
        }

        result
    }

    async fn save(&self, update: &SectionUpdate) -> Result<SectionPayload, GatewayError> {
        let section = update.section();
        self.saves[section.index()].fetch_add(1, Ordering::SeqCst);

        if self.failing_saves.lock().contains(&section) {
            return Err(Self::injected(section));
        }

        let mut rows = self.rows.lock();
        let stored = match update {
            SectionUpdate::Site(patch) => {
                let site = rows.site.get_or_insert_with(SiteInfo::default);
                apply_site_patch(site, patch);
                SectionPayload::Site(site.clone())
            }
            SectionUpdate::Appearance(patch) => {
                let theme = rows.theme.get_or_insert_with(Theme::default);
                apply_theme_patch(theme, patch);
                SectionPayload::Appearance(theme.clone())
            }
            SectionUpdate::Menu(menu) => {
                rows.menu = menu.clone();
                SectionPayload::Menu(menu.clone())
            }
        };

        Ok(stored)
    }
}

/// Apply a partial update the way `$set` does: fields the patch leaves
/// out keep their stored value.
fn apply_site_patch(site: &mut SiteInfo, patch: &SitePatch) {
    let fields = [
        (&mut site.restaurant_name, &patch.restaurant_name),
        (&mut site.whatsapp_number, &patch.whatsapp_number),
        (&mut site.currency_symbol, &patch.currency_symbol),
        (&mut site.opening_hours, &patch.opening_hours),
        (&mut site.footer_text, &patch.footer_text),
    ];
    set_present(fields);
}

fn apply_theme_patch(theme: &mut Theme, patch: &ThemePatch) {
    let fields = [
        (&mut theme.primary_color, &patch.primary_color),
        (&mut theme.secondary_color, &patch.secondary_color),
        (&mut theme.accent_color, &patch.accent_color),
        (&mut theme.background_color, &patch.background_color),
        (&mut theme.text_color, &patch.text_color),
        (&mut theme.card_color, &patch.card_color),
    ];
    set_present(fields);
}

fn set_present<const N: usize>(fields: [(&mut String, &Option<String>); N]) {
    for (current, update) in fields {
        if let Some(value) = update {
            *current = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_patch_keeps_unspecified_fields() {
        let mut site = SiteInfo {
            restaurant_name: "Casa".to_string(),
            footer_text: "Since 1999".to_string(),
            ..Default::default()
        };

        apply_site_patch(&mut site, &SitePatch::default().whatsapp_number("+5491100000000"));

        assert_eq!(site.restaurant_name, "Casa");
        assert_eq!(site.footer_text, "Since 1999");
        assert_eq!(site.whatsapp_number, "+5491100000000");
    }

    #[test]
    fn test_theme_patch_only_touches_given_colors() {
        let mut theme = Theme {
            accent_color: "#222".to_string(),
            ..Default::default()
        };

        apply_theme_patch(&mut theme, &ThemePatch::default().primary_color("#111"));

        assert_eq!(theme.primary_color, "#111");
        assert_eq!(theme.accent_color, "#222");
        assert!(theme.card_color.is_empty());
    }
}
