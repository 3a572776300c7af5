use crate::error::{DatabaseError, Result};
use sso_models::{EmailTemplate, NewEmailTemplate, UpdateEmailTemplate};
use sqlx::PgPool;

#[derive(Clone)]
pub struct EmailTemplateRepository {
    pool: PgPool,
}

impl EmailTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, template: &NewEmailTemplate) -> Result<EmailTemplate> {
        sqlx::query_as::<_, EmailTemplate>(
            r#"
            INSERT INTO email_templates (key, title, description, template, args)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&template.key)
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.template)
        .bind(serde_json::json!(template.args))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::on_unique(e, "EmailTemplate", "key"))
    }

    pub async fn find_by_key(&self, key: &str) -> Result<EmailTemplate> {
        sqlx::query_as::<_, EmailTemplate>("SELECT * FROM email_templates WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("EmailTemplate", key))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<EmailTemplate>> {
        let templates = sqlx::query_as::<_, EmailTemplate>(
            "SELECT * FROM email_templates ORDER BY key LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM email_templates")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn update(&self, key: &str, update: &UpdateEmailTemplate) -> Result<EmailTemplate> {
        sqlx::query_as::<_, EmailTemplate>(
            r#"
            UPDATE email_templates
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                template = COALESCE($4, template),
                args = COALESCE($5, args)
            WHERE key = $1
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.template)
        .bind(update.args.as_ref().map(|args| serde_json::json!(args)))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("EmailTemplate", key))
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM email_templates WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
