//! Repository module - one repository per configuration section.

mod menu_repository;
mod settings_repository;

pub use menu_repository::MenuRepository;
pub use settings_repository::{AppearanceRepository, SettingsRepository, SiteRepository};
