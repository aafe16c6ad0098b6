//! Site information models.

use serde::{Deserialize, Serialize};

/// Restaurant identity shown across the storefront.
///
/// Every field defaults to an empty string so a partially provisioned
/// document still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    #[serde(default)]
    pub restaurant_name: String,

    /// WhatsApp contact number orders are sent to
    #[serde(default)]
    pub whatsapp_number: String,

    #[serde(default)]
    pub currency_symbol: String,

    /// Free-form opening hours text
    #[serde(default)]
    pub opening_hours: String,

    #[serde(default)]
    pub footer_text: String,
}

/// Partial update for [`SiteInfo`].
///
/// Fields left as `None` are not written, so an editor that only owns
/// some fields never blanks out the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
}

impl SitePatch {
    /// Set the restaurant name (builder pattern).
    #[must_use]
    pub fn restaurant_name(mut self, name: impl Into<String>) -> Self {
        self.restaurant_name = Some(name.into());
        self
    }

    /// Set the WhatsApp number (builder pattern).
    #[must_use]
    pub fn whatsapp_number(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_number = Some(number.into());
        self
    }
}
