use crate::error::{DatabaseError, Result};
use sso_models::{CreateOrganisation, Organisation, UpdateOrganisation};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrganisationRepository {
    pool: PgPool,
}

impl OrganisationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateOrganisation) -> Result<Organisation> {
        let extra_fields = request
            .extra_fields
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        let organisation = sqlx::query_as::<_, Organisation>(
            r#"
            INSERT INTO organisations (id, name, org_type, thumbnail_url, banner_url, extra_fields)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.org_type)
        .bind(&request.thumbnail_url)
        .bind(&request.banner_url)
        .bind(extra_fields)
        .fetch_one(&self.pool)
        .await?;

        Ok(organisation)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Organisation> {
        sqlx::query_as::<_, Organisation>("SELECT * FROM organisations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Organisation", &id.to_string()))
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM organisations WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Organisation>> {
        let organisations = sqlx::query_as::<_, Organisation>(
            "SELECT * FROM organisations WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(organisations)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Organisation>> {
        let organisations = sqlx::query_as::<_, Organisation>(
            "SELECT * FROM organisations ORDER BY created_at, name LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(organisations)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM organisations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn update(&self, id: Uuid, update: &UpdateOrganisation) -> Result<Organisation> {
        let organisation = sqlx::query_as::<_, Organisation>(
            r#"
            UPDATE organisations
            SET name = COALESCE($2, name),
                org_type = COALESCE($3, org_type),
                thumbnail_url = COALESCE($4, thumbnail_url),
                banner_url = COALESCE($5, banner_url),
                extra_fields = COALESCE($6, extra_fields),
                manager_id = COALESCE($7, manager_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.org_type)
        .bind(&update.thumbnail_url)
        .bind(&update.banner_url)
        .bind(&update.extra_fields)
        .bind(update.manager_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Organisation", &id.to_string()))?;

        Ok(organisation)
    }

    pub async fn set_manager(&self, id: Uuid, manager_id: Uuid) -> Result<Organisation> {
        self.update(
            id,
            &UpdateOrganisation {
                manager_id: Some(manager_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete an organisation. Links and their role mappings cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM organisation_invitations WHERE organisation_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM organisations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
