use crate::error::{DatabaseError, Result};
use sso_models::{ExtraField, NewExtraField};
use sqlx::PgPool;

#[derive(Clone)]
pub struct ExtraFieldRepository {
    pool: PgPool,
}

impl ExtraFieldRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<ExtraField>> {
        let fields = sqlx::query_as::<_, ExtraField>("SELECT * FROM extra_fields ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(fields)
    }

    pub async fn create(&self, field: &NewExtraField) -> Result<ExtraField> {
        sqlx::query_as::<_, ExtraField>(
            r#"
            INSERT INTO extra_fields (field_type, name, default_value, editable, required, validators)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&field.field_type)
        .bind(&field.name)
        .bind(&field.default_value)
        .bind(field.editable)
        .bind(field.required)
        .bind(&field.validators)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::on_unique(e, "ExtraField", "name"))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM extra_fields WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
