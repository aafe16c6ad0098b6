//! Appearance (theme) models.

use serde::{Deserialize, Serialize};

/// The six named storefront colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub primary_color: String,

    #[serde(default)]
    pub secondary_color: String,

    #[serde(default)]
    pub accent_color: String,

    #[serde(default)]
    pub background_color: String,

    #[serde(default)]
    pub text_color: String,

    /// Background of menu cards
    #[serde(default)]
    pub card_color: String,
}

/// Partial update for [`Theme`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_color: Option<String>,
}

impl ThemePatch {
    /// Set the primary color (builder pattern).
    #[must_use]
    pub fn primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = Some(color.into());
        self
    }

    /// Set the accent color (builder pattern).
    #[must_use]
    pub fn accent_color(mut self, color: impl Into<String>) -> Self {
        self.accent_color = Some(color.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_skips_none_on_the_wire() {
        let patch = ThemePatch::default().accent_color("#f60");
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json, serde_json::json!({ "accentColor": "#f60" }));
    }

    #[test]
    fn test_missing_colors_deserialize_as_empty() {
        let theme: Theme = serde_json::from_str(r##"{"primaryColor":"#111"}"##).unwrap();

        assert_eq!(theme.primary_color, "#111");
        assert!(theme.card_color.is_empty());
    }
}
