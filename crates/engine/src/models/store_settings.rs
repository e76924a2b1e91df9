//! Storefront branding and copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mona_core::{StoreSettingsId, TenantId};

/// Store name used when a merchant has not set one.
pub const DEFAULT_STORE_NAME: &str = "Your Store";

/// Niche used when a merchant has not set one.
pub const DEFAULT_NICHE: &str = "general";

/// A tenant's storefront settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    pub id: StoreSettingsId,
    pub user_id: TenantId,
    pub store_name: Option<String>,
    pub store_domain: Option<String>,
    pub niche: Option<String>,
    pub primary_color: Option<String>,
    pub heading_font: Option<String>,
    pub body_font: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub footer_description: Option<String>,
    pub hero_image: Option<String>,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreSettings {
    /// Store name, falling back to [`DEFAULT_STORE_NAME`].
    #[must_use]
    pub fn store_name_or_default(&self) -> &str {
        self.store_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_STORE_NAME)
    }

    /// Niche, falling back to [`DEFAULT_NICHE`].
    #[must_use]
    pub fn niche_or_default(&self) -> &str {
        self.niche
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_NICHE)
    }
}

/// Partial settings write. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSettingsUpdate {
    pub store_name: Option<String>,
    pub store_domain: Option<String>,
    pub niche: Option<String>,
    pub primary_color: Option<String>,
    pub heading_font: Option<String>,
    pub body_font: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub footer_description: Option<String>,
    pub hero_image: Option<String>,
    pub onboarding_completed: Option<bool>,
}

impl StoreSettingsUpdate {
    /// Names of the fields this update sets, in column order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("store_name", self.store_name.is_some()),
            ("store_domain", self.store_domain.is_some()),
            ("niche", self.niche.is_some()),
            ("primary_color", self.primary_color.is_some()),
            ("heading_font", self.heading_font.is_some()),
            ("body_font", self.body_font.is_some()),
            ("hero_title", self.hero_title.is_some()),
            ("hero_description", self.hero_description.is_some()),
            ("footer_description", self.footer_description.is_some()),
            ("hero_image", self.hero_image.is_some()),
            ("onboarding_completed", self.onboarding_completed.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_fields() {
        let update = StoreSettingsUpdate {
            primary_color: Some("#111111".to_owned()),
            hero_image: Some("https://cdn.example/hero.jpg".to_owned()),
            ..StoreSettingsUpdate::default()
        };
        assert_eq!(update.changed_fields(), vec!["primary_color", "hero_image"]);
        assert!(StoreSettingsUpdate::default().changed_fields().is_empty());
    }
}
