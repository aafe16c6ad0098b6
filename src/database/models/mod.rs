//! Database model exports.

pub mod appearance;
pub mod menu;
pub mod site;

pub use appearance::{Theme, ThemePatch};
pub use menu::{Category, CategoryDocument, ItemDocument, MenuItem};
pub use site::{SiteInfo, SitePatch};
