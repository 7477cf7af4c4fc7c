use crate::db::Database;
use crate::error::AppResult;
use crate::models::prototype::{OsOption, Submission, SubmitOsForm};

pub const RECENT_SUBMISSIONS_LIMIT: i64 = 5;

pub struct PrototypeService<'a> {
    db: &'a Database,
}

impl<'a> PrototypeService<'a> {
    pub fn new(db: &'a Database) -> Self {
        PrototypeService { db }
    }

    pub async fn get_os_options(&self) -> AppResult<Vec<OsOption>> {
        let options = sqlx::query_as::<_, OsOption>(
            "SELECT id, name, description, image FROM os_options ORDER BY id",
        )
        .fetch_all(&self.db.pool)
        .await?;

        Ok(options)
    }

    pub async fn insert_submission(&self, form: &SubmitOsForm) -> AppResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO os_configurations (selected_os, option, customization_details)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&form.selected_os)
        .bind(&form.option)
        .bind(&form.customization_details)
        .execute(&self.db.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_recent_submissions(&self) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, selected_os, option, customization_details
            FROM os_configurations
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_SUBMISSIONS_LIMIT)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(submissions)
    }
}
