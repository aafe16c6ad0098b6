//! The merged, UI-facing configuration view.

use std::sync::Arc;

use crate::database::models::{Category, SiteInfo, Theme};

use super::section::Section;

/// One section's slot in the snapshot.
///
/// `Unloaded` is the explicit "not yet loaded" sentinel; a loaded section
/// whose store row is empty is `Loaded` with empty values.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Unloaded,
    Loaded(Arc<T>),
}

impl<T> Slot<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value.as_ref()),
            Self::Unloaded => None,
        }
    }

    /// Whether both slots point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Loaded(a), Self::Loaded(b)) => Arc::ptr_eq(a, b),
            (Self::Unloaded, Self::Unloaded) => true,
            _ => false,
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Unloaded
    }
}

/// Restaurant identity, theme and menu merged into one value.
///
/// Snapshots are immutable and shared as `Arc`. Merging a section clones
/// the `Arc`s of the other sections, so unchanged sections keep pointer
/// identity across snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationSnapshot {
    pub site: Slot<SiteInfo>,
    pub appearance: Slot<Theme>,
    pub menu: Slot<Vec<Category>>,
}

impl ConfigurationSnapshot {
    pub fn is_loaded(&self, section: Section) -> bool {
        match section {
            Section::Site => self.site.is_loaded(),
            Section::Appearance => self.appearance.is_loaded(),
            Section::Menu => self.menu.is_loaded(),
        }
    }

    fn site_field(&self, field: impl Fn(&SiteInfo) -> &str) -> &str {
        self.site.get().map(field).unwrap_or("")
    }

    fn theme_field(&self, field: impl Fn(&Theme) -> &str) -> &str {
        self.appearance.get().map(field).unwrap_or("")
    }

    pub fn restaurant_name(&self) -> &str {
        self.site_field(|s| s.restaurant_name.as_str())
    }

    pub fn whatsapp_number(&self) -> &str {
        self.site_field(|s| s.whatsapp_number.as_str())
    }

    pub fn currency_symbol(&self) -> &str {
        self.site_field(|s| s.currency_symbol.as_str())
    }

    pub fn opening_hours(&self) -> &str {
        self.site_field(|s| s.opening_hours.as_str())
    }

    pub fn footer_text(&self) -> &str {
        self.site_field(|s| s.footer_text.as_str())
    }

    pub fn primary_color(&self) -> &str {
        self.theme_field(|t| t.primary_color.as_str())
    }

    pub fn secondary_color(&self) -> &str {
        self.theme_field(|t| t.secondary_color.as_str())
    }

    pub fn accent_color(&self) -> &str {
        self.theme_field(|t| t.accent_color.as_str())
    }

    pub fn background_color(&self) -> &str {
        self.theme_field(|t| t.background_color.as_str())
    }

    pub fn text_color(&self) -> &str {
        self.theme_field(|t| t.text_color.as_str())
    }

    pub fn card_color(&self) -> &str {
        self.theme_field(|t| t.card_color.as_str())
    }

    /// Ordered categories, empty until the menu has loaded.
    pub fn categories(&self) -> &[Category] {
        self.menu.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_snapshot_reads_as_empty() {
        let snapshot = ConfigurationSnapshot::default();

        assert_eq!(snapshot.restaurant_name(), "");
        assert_eq!(snapshot.primary_color(), "");
        assert!(snapshot.categories().is_empty());
        assert!(!snapshot.is_loaded(Section::Site));
    }

    #[test]
    fn test_loaded_empty_is_distinguishable() {
        let snapshot = ConfigurationSnapshot {
            site: Slot::Loaded(Arc::new(SiteInfo::default())),
            ..Default::default()
        };

        assert_eq!(snapshot.restaurant_name(), "");
        assert!(snapshot.is_loaded(Section::Site));
        assert!(!snapshot.is_loaded(Section::Menu));
    }
}
