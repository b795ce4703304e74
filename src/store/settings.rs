use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::engine::service::SettingsProvider;
use crate::model::settings::{AttendanceSettings, SettingsRow};

/// SQL-backed settings provider. The singleton row is read on demand and
/// held in a short-TTL cache so every submission does not hit the database;
/// the cache lives on the provider, never in a process-global.
#[derive(Clone)]
pub struct SqlSettingsProvider {
    pool: MySqlPool,
    cache: Cache<(), Option<SettingsRow>>,
}

impl SqlSettingsProvider {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        Self {
            pool,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    async fn fetch(&self) -> Result<Option<SettingsRow>, sqlx::Error> {
        sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT window_start, window_end, office_latitude, office_longitude, max_distance_m
            FROM attendance_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }

    /// Startup probe: prime the cache and log whether submissions will be
    /// accepted with the configuration as stored.
    pub async fn warmup(&self) -> Result<()> {
        let row = self.fetch().await?;

        match row.as_ref() {
            Some(row) => match AttendanceSettings::try_from(row) {
                Ok(settings) => info!(
                    max_distance_m = settings.max_distance_m,
                    "Attendance settings loaded"
                ),
                Err(reason) => warn!(
                    %reason,
                    "Attendance settings are invalid; submissions will be denied until fixed"
                ),
            },
            None => warn!("No attendance settings row; submissions will be denied until configured"),
        }

        self.cache.insert((), row).await;
        Ok(())
    }
}

#[async_trait]
impl SettingsProvider for SqlSettingsProvider {
    async fn current(&self) -> Result<Option<SettingsRow>, sqlx::Error> {
        if let Some(row) = self.cache.get(&()).await {
            return Ok(row);
        }

        let row = self.fetch().await?;
        self.cache.insert((), row.clone()).await;
        Ok(row)
    }
}
