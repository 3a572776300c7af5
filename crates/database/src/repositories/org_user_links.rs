use crate::error::{DatabaseError, Result};
use sso_models::{OrgUserLink, OrganisationMember};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrgUserLinkRepository {
    pool: PgPool,
}

impl OrgUserLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a user to an organisation
    pub async fn create(&self, user_id: Uuid, organisation_id: Uuid) -> Result<OrgUserLink> {
        let link = sqlx::query_as::<_, OrgUserLink>(
            r#"
            INSERT INTO org_user_links (user_id, organisation_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(organisation_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::on_unique(e, "OrgUserLink", "user and organisation"))?;

        Ok(link)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<OrgUserLink> {
        sqlx::query_as::<_, OrgUserLink>("SELECT * FROM org_user_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("OrgUserLink", &id.to_string()))
    }

    pub async fn find(&self, user_id: Uuid, organisation_id: Uuid) -> Result<Option<OrgUserLink>> {
        let link = sqlx::query_as::<_, OrgUserLink>(
            "SELECT * FROM org_user_links WHERE user_id = $1 AND organisation_id = $2",
        )
        .bind(user_id)
        .bind(organisation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrgUserLink>> {
        let links = sqlx::query_as::<_, OrgUserLink>(
            "SELECT * FROM org_user_links WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    pub async fn count_for_organisation(&self, organisation_id: Uuid) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM org_user_links WHERE organisation_id = $1")
                .bind(organisation_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Members of an organisation with the role names of their link
    pub async fn members(
        &self,
        organisation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrganisationMember>> {
        let members = sqlx::query_as::<_, OrganisationMember>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.thumbnail,
                   l.id AS link_id,
                   COALESCE(array_agg(m.role ORDER BY m.role) FILTER (WHERE m.role IS NOT NULL), '{}') AS roles
            FROM org_user_links l
            INNER JOIN users u ON u.id = l.user_id
            LEFT JOIN user_role_mappings m ON m.org_user_link_id = l.id
            WHERE l.organisation_id = $1
            GROUP BY u.id, l.id
            ORDER BY u.email
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organisation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    /// Remove a user from an organisation
    pub async fn delete(&self, user_id: Uuid, organisation_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM org_user_links WHERE user_id = $1 AND organisation_id = $2",
        )
        .bind(user_id)
        .bind(organisation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
