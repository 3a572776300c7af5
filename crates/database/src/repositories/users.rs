use crate::error::{DatabaseError, Result};
use crate::repositories::credentials::NewCredentials;
use sso_models::user::{NewUser, UpdateProfile, UpdateUser};
use sso_models::User;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user, its credentials row and its global roles in one transaction
    pub async fn create_with_credentials(
        &self,
        new_user: &NewUser,
        credentials: &NewCredentials,
        roles: &[String],
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, user_type, email, phone, first_name, last_name, thumbnail, extra_fields)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.user_type)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.thumbnail)
        .bind(&new_user.extra_fields)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::on_unique(e, "User", "email"))?;

        sqlx::query(
            r#"
            INSERT INTO user_credentials (id, user_id, password_hash, activation_code)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&credentials.password_hash)
        .bind(&credentials.activation_code)
        .execute(&mut *tx)
        .await?;

        for role in roles {
            sqlx::query("INSERT INTO user_role_mappings (user_id, role) VALUES ($1, $2)")
                .bind(user.id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", &id.to_string()))?;

        Ok(user)
    }

    /// Find user by email. Emails are unique across the whole store.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at, email LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Admin update. Role changes are applied separately.
    pub async fn update(&self, id: Uuid, update: &UpdateUser) -> Result<User> {
        let mut query_builder = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET updated_at = NOW()");

        if let Some(ref email) = update.email {
            query_builder.push(", email = ");
            query_builder.push_bind(email);
        }

        if let Some(ref user_type) = update.user_type {
            query_builder.push(", user_type = ");
            query_builder.push_bind(user_type);
        }

        if let Some(ref phone) = update.phone {
            query_builder.push(", phone = ");
            query_builder.push_bind(phone);
        }

        if let Some(ref first_name) = update.first_name {
            query_builder.push(", first_name = ");
            query_builder.push_bind(first_name);
        }

        if let Some(ref last_name) = update.last_name {
            query_builder.push(", last_name = ");
            query_builder.push_bind(last_name);
        }

        if let Some(ref thumbnail) = update.thumbnail {
            query_builder.push(", thumbnail = ");
            query_builder.push_bind(thumbnail);
        }

        if let Some(blocked) = update.blocked {
            query_builder.push(", blocked = ");
            query_builder.push_bind(blocked);
        }

        if let Some(valid_until) = update.valid_until {
            query_builder.push(", valid_until = ");
            query_builder.push_bind(valid_until);
        }

        if let Some(ref extra_fields) = update.extra_fields {
            query_builder.push(", extra_fields = ");
            query_builder.push_bind(extra_fields);
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING *");

        let user = query_builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::on_unique(e, "User", "email"))?
            .ok_or_else(|| DatabaseError::not_found("User", &id.to_string()))?;

        Ok(user)
    }

    /// Self-service update. `extra_fields` is the already merged document.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &UpdateProfile,
        extra_fields: &serde_json::Value,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                thumbnail = COALESCE($4, thumbnail),
                extra_fields = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.thumbnail)
        .bind(extra_fields)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", &id.to_string()))?;

        Ok(user)
    }

    /// Store a phone number pending confirmation
    pub async fn set_phone(&self, id: Uuid, phone: &str, code_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET phone = $2, phone_activation_code = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(phone)
        .bind(code_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn confirm_phone(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE users SET phone_activation_code = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a user. Credentials, links and mappings cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_role_mappings WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM organisation_invitations WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE organisations SET manager_id = NULL WHERE manager_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DatabaseConfig};

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_create_and_find_user() {
        let db = Database::new(DatabaseConfig::from_env()).await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        let email = format!("{}@example.com", Uuid::new_v4());
        let user = repo
            .create_with_credentials(
                &NewUser::invited(&email),
                &NewCredentials::default(),
                &["USER".to_string()],
            )
            .await
            .unwrap();

        let found = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        let duplicate = repo
            .create_with_credentials(&NewUser::invited(&email), &NewCredentials::default(), &[])
            .await;
        assert!(matches!(duplicate, Err(DatabaseError::DuplicateEntry(_))));

        assert!(repo.delete(user.id).await.unwrap());
    }
}
