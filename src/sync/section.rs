//! Configuration sections and their payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::database::models::{Category, SiteInfo, SitePatch, Theme, ThemePatch};

/// One independently loadable slice of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Site,
    Appearance,
    Menu,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Site, Section::Appearance, Section::Menu];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Appearance => "appearance",
            Self::Menu => "menu",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Site => 0,
            Self::Appearance => 1,
            Self::Menu => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The complete value of one section, as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionPayload {
    Site(SiteInfo),
    Appearance(Theme),
    Menu(Vec<Category>),
}

impl SectionPayload {
    pub fn section(&self) -> Section {
        match self {
            Self::Site(_) => Section::Site,
            Self::Appearance(_) => Section::Appearance,
            Self::Menu(_) => Section::Menu,
        }
    }

    /// Explicit empty value for a section that was never provisioned.
    pub fn empty(section: Section) -> Self {
        match section {
            Section::Site => Self::Site(SiteInfo::default()),
            Section::Appearance => Self::Appearance(Theme::default()),
            Section::Menu => Self::Menu(Vec::new()),
        }
    }
}

/// A write request for one section.
///
/// Site and appearance writes are partial; the menu is always written as
/// the whole catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    Site(SitePatch),
    Appearance(ThemePatch),
    Menu(Vec<Category>),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            Self::Site(_) => Section::Site,
            Self::Appearance(_) => Section::Appearance,
            Self::Menu(_) => Section::Menu,
        }
    }
}

/// Per-section "has loaded at least once" flags.
///
/// This says nothing about freshness; see `SectionCache::is_fresh`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionLoadStatus {
    pub site: bool,
    pub appearance: bool,
    pub menu: bool,
}

impl SectionLoadStatus {
    pub fn get(&self, section: Section) -> bool {
        match section {
            Section::Site => self.site,
            Section::Appearance => self.appearance,
            Section::Menu => self.menu,
        }
    }

    pub fn set(&mut self, section: Section, loaded: bool) {
        match section {
            Section::Site => self.site = loaded,
            Section::Appearance => self.appearance = loaded,
            Section::Menu => self.menu = loaded,
        }
    }

    pub fn all(&self) -> bool {
        self.site && self.appearance && self.menu
    }
}

/// Observable state of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Unloaded,
    Loading,
    Loaded { fresh: bool },
}
