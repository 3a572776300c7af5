use crate::error::Result;
use chrono::{DateTime, Utc};
use sso_models::UserCredentials;
use sqlx::PgPool;
use uuid::Uuid;

/// Values stored when a credentials row is created
#[derive(Debug, Clone, Default)]
pub struct NewCredentials {
    pub password_hash: Option<String>,
    pub activation_code: Option<String>,
}

#[derive(Clone)]
pub struct CredentialsRepository {
    pool: PgPool,
}

impl CredentialsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT * FROM user_credentials WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Credentials for a set of users, used by admin listings
    pub async fn find_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT * FROM user_credentials WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Clear the activation code, optionally setting the first password
    pub async fn activate(&self, user_id: Uuid, password_hash: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_credentials
            SET activation_code = NULL,
                password_hash = COALESCE($2, password_hash)
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE user_credentials SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_reset_code(
        &self,
        user_id: Uuid,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_credentials
            SET password_reset_code = $2, password_reset_expires_at = $3
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store the new password and consume the reset code.
    /// Returns false when the code was already consumed.
    pub async fn complete_reset(
        &self,
        user_id: Uuid,
        code_hash: &str,
        password_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_credentials
            SET password_hash = $3,
                password_reset_code = NULL,
                password_reset_expires_at = NULL
            WHERE user_id = $1 AND password_reset_code = $2
            "#,
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
