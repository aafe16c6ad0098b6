//! Database module exports.

pub mod models;
mod mongo;
mod repository;

pub use models::*;
pub use mongo::Database;
pub use repository::{AppearanceRepository, MenuRepository, SettingsRepository, SiteRepository};
