//! Database operations for storefront settings.
//!
//! Settings are keyed by tenant, so writes always name one.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use mona_core::{StoreSettingsId, TenantId};

use super::RepositoryError;
use crate::models::{StoreSettings, StoreSettingsUpdate};

const COLUMNS: &str = "id, user_id, store_name, store_domain, niche, primary_color, heading_font, \
                       body_font, hero_title, hero_description, footer_description, hero_image, \
                       onboarding_completed, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct StoreSettingsRow {
    id: StoreSettingsId,
    user_id: TenantId,
    store_name: Option<String>,
    store_domain: Option<String>,
    niche: Option<String>,
    primary_color: Option<String>,
    heading_font: Option<String>,
    body_font: Option<String>,
    hero_title: Option<String>,
    hero_description: Option<String>,
    footer_description: Option<String>,
    hero_image: Option<String>,
    onboarding_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreSettingsRow> for StoreSettings {
    fn from(row: StoreSettingsRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            store_name: row.store_name,
            store_domain: row.store_domain,
            niche: row.niche,
            primary_color: row.primary_color,
            heading_font: row.heading_font,
            body_font: row.body_font,
            hero_title: row.hero_title,
            hero_description: row.hero_description,
            footer_description: row.footer_description,
            hero_image: row.hero_image,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for store settings.
pub struct StoreSettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StoreSettingsRepository<'a> {
    /// Create a new store settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Settings for `tenant`, or the first stored settings when `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(
        &self,
        tenant: Option<&TenantId>,
    ) -> Result<Option<StoreSettings>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM store_settings WHERE (?1 IS NULL OR user_id = ?1) \
             ORDER BY created_at LIMIT 1"
        );
        let row: Option<StoreSettingsRow> = sqlx::query_as(&sql)
            .bind(tenant)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(StoreSettings::from))
    }

    /// Create or update a tenant's settings, writing only the fields set in
    /// `update`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    #[instrument(skip(self, update), fields(user_id = %tenant, fields = ?update.changed_fields()))]
    pub async fn upsert(
        &self,
        tenant: &TenantId,
        update: &StoreSettingsUpdate,
    ) -> Result<StoreSettings, RepositoryError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO store_settings (id, user_id, store_name, store_domain, niche, \
                primary_color, heading_font, body_font, hero_title, hero_description, \
                footer_description, hero_image, onboarding_completed, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, COALESCE(?13, 0), ?14, ?14) \
             ON CONFLICT(user_id) DO UPDATE SET \
                store_name = COALESCE(?3, store_name), \
                store_domain = COALESCE(?4, store_domain), \
                niche = COALESCE(?5, niche), \
                primary_color = COALESCE(?6, primary_color), \
                heading_font = COALESCE(?7, heading_font), \
                body_font = COALESCE(?8, body_font), \
                hero_title = COALESCE(?9, hero_title), \
                hero_description = COALESCE(?10, hero_description), \
                footer_description = COALESCE(?11, footer_description), \
                hero_image = COALESCE(?12, hero_image), \
                onboarding_completed = COALESCE(?13, onboarding_completed), \
                updated_at = ?14 \
             RETURNING {COLUMNS}"
        );
        let row: StoreSettingsRow = sqlx::query_as(&sql)
            .bind(StoreSettingsId::new())
            .bind(tenant)
            .bind(update.store_name.as_deref())
            .bind(update.store_domain.as_deref())
            .bind(update.niche.as_deref())
            .bind(update.primary_color.as_deref())
            .bind(update.heading_font.as_deref())
            .bind(update.body_font.as_deref())
            .bind(update.hero_title.as_deref())
            .bind(update.hero_description.as_deref())
            .bind(update.footer_description.as_deref())
            .bind(update.hero_image.as_deref())
            .bind(update.onboarding_completed)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Tenants that have finished onboarding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn onboarded_tenants(&self) -> Result<Vec<TenantId>, RepositoryError> {
        let tenants: Vec<TenantId> = sqlx::query_scalar(
            "SELECT user_id FROM store_settings WHERE onboarding_completed = 1 ORDER BY created_at",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(tenants)
    }
}
