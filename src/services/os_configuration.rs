use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::os_configuration::{NewOsConfiguration, OsConfiguration};
use crate::utils::time::current_timestamp_seconds;

pub struct OsConfigurationService<'a> {
    db: &'a Database,
}

impl<'a> OsConfigurationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        OsConfigurationService { db }
    }

    pub async fn insert(&self, form: &NewOsConfiguration) -> AppResult<OsConfiguration> {
        let now = current_timestamp_seconds();
        let packages_json = serde_json::to_string(&form.packages)?;

        let result = sqlx::query(
            r#"
            INSERT INTO os_configuration
                (operating_system, config_type, configuration_type, packages,
                 has_custom_wallpaper, download_iso_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(form.operating_system.as_str())
        .bind(form.config_type.as_str())
        .bind(&form.configuration_type)
        .bind(&packages_json)
        .bind(form.has_custom_wallpaper)
        .bind(&form.download_iso_url)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create configuration".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<OsConfiguration>> {
        let record = sqlx::query_as::<_, OsConfiguration>(
            r#"
            SELECT id, operating_system, config_type, configuration_type, packages,
                   has_custom_wallpaper, download_iso_url, created_at
            FROM os_configuration
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(record)
    }

    /// Most recent first. Ties on `created_at` fall back to insertion order.
    pub async fn get_recent(&self, limit: i64) -> AppResult<Vec<OsConfiguration>> {
        let records = sqlx::query_as::<_, OsConfiguration>(
            r#"
            SELECT id, operating_system, config_type, configuration_type, packages,
                   has_custom_wallpaper, download_iso_url, created_at
            FROM os_configuration
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(records)
    }
}
