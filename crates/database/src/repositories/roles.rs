use crate::error::{DatabaseError, Result};
use sso_models::{NewRole, Role, UpdateRole};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, role: &NewRole) -> Result<Role> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description, org_type, org_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(&role.org_type)
        .bind(role.org_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(role)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Role> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Role", &id.to_string()))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles ORDER BY name, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Roles scoped to this organisation or to every organisation of its type
    pub async fn available_for(&self, org_id: Uuid, org_type: Option<&str>) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT * FROM roles
            WHERE org_id = $1 OR ($2::text IS NOT NULL AND org_type = $2)
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .bind(org_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn update(&self, id: i64, update: &UpdateRole) -> Result<Role> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                org_type = COALESCE($4, org_type),
                org_id = COALESCE($5, org_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.org_type)
        .bind(update.org_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Role", &id.to_string()))
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
