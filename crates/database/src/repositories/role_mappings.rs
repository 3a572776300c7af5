use crate::error::Result;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Owner of a set of role mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleHolder {
    /// Global roles of a user
    User(Uuid),
    /// Roles of a user inside one organisation
    Link(i64),
}

#[derive(Clone)]
pub struct RoleMappingRepository {
    pool: PgPool,
}

impl RoleMappingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Role names held by `holder`, sorted
    pub async fn roles(&self, holder: RoleHolder) -> Result<Vec<String>> {
        let roles: Vec<(String,)> = match holder {
            RoleHolder::User(user_id) => {
                sqlx::query_as(
                    r#"
                    SELECT DISTINCT role FROM user_role_mappings
                    WHERE user_id = $1 AND org_user_link_id IS NULL
                    ORDER BY role
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            RoleHolder::Link(link_id) => {
                sqlx::query_as(
                    "SELECT DISTINCT role FROM user_role_mappings WHERE org_user_link_id = $1 ORDER BY role",
                )
                .bind(link_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(roles.into_iter().map(|(role,)| role).collect())
    }

    /// Global roles for many users at once
    pub async fn roles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<(Uuid, String)>> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT user_id, role FROM user_role_mappings
            WHERE user_id = ANY($1) AND org_user_link_id IS NULL
            ORDER BY role
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Add and remove role names for `holder` in one transaction
    pub async fn apply(&self, holder: RoleHolder, added: &[String], removed: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for role in removed {
            Self::remove_in(&mut tx, holder, role).await?;
        }

        for role in added {
            Self::add_in(&mut tx, holder, role).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn add(&self, holder: RoleHolder, role: &str) -> Result<()> {
        self.apply(holder, &[role.to_string()], &[]).await
    }

    async fn add_in(tx: &mut Transaction<'_, Postgres>, holder: RoleHolder, role: &str) -> Result<()> {
        match holder {
            RoleHolder::User(user_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO user_role_mappings (user_id, role)
                    SELECT $1, $2
                    WHERE NOT EXISTS (
                        SELECT 1 FROM user_role_mappings
                        WHERE user_id = $1 AND role = $2 AND org_user_link_id IS NULL
                    )
                    "#,
                )
                .bind(user_id)
                .bind(role)
                .execute(&mut **tx)
                .await?;
            }
            RoleHolder::Link(link_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO user_role_mappings (org_user_link_id, role)
                    SELECT $1, $2
                    WHERE NOT EXISTS (
                        SELECT 1 FROM user_role_mappings
                        WHERE org_user_link_id = $1 AND role = $2
                    )
                    "#,
                )
                .bind(link_id)
                .bind(role)
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    async fn remove_in(
        tx: &mut Transaction<'_, Postgres>,
        holder: RoleHolder,
        role: &str,
    ) -> Result<()> {
        match holder {
            RoleHolder::User(user_id) => {
                sqlx::query(
                    "DELETE FROM user_role_mappings WHERE user_id = $1 AND role = $2 AND org_user_link_id IS NULL",
                )
                .bind(user_id)
                .bind(role)
                .execute(&mut **tx)
                .await?;
            }
            RoleHolder::Link(link_id) => {
                sqlx::query("DELETE FROM user_role_mappings WHERE org_user_link_id = $1 AND role = $2")
                    .bind(link_id)
                    .bind(role)
                    .execute(&mut **tx)
                    .await?;
            }
        }

        Ok(())
    }
}
