use crate::error::{DatabaseError, Result};
use sso_models::{InvitationStatus, InvitationWithUser, OrgUserLink, OrganisationInvitation};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organisation_id: Uuid,
        user_id: Uuid,
    ) -> Result<OrganisationInvitation> {
        let invitation = sqlx::query_as::<_, OrganisationInvitation>(
            r#"
            INSERT INTO organisation_invitations (organisation_id, user_id, response)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(organisation_id)
        .bind(user_id)
        .bind(InvitationStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(invitation)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<OrganisationInvitation> {
        sqlx::query_as::<_, OrganisationInvitation>(
            "SELECT * FROM organisation_invitations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("OrganisationInvitation", &id.to_string()))
    }

    pub async fn find_pending(
        &self,
        user_id: Uuid,
        organisation_id: Uuid,
    ) -> Result<Option<OrganisationInvitation>> {
        let invitation = sqlx::query_as::<_, OrganisationInvitation>(
            r#"
            SELECT * FROM organisation_invitations
            WHERE user_id = $1 AND organisation_id = $2 AND response = $3
            "#,
        )
        .bind(user_id)
        .bind(organisation_id)
        .bind(InvitationStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrganisationInvitation>> {
        let invitations = sqlx::query_as::<_, OrganisationInvitation>(
            "SELECT * FROM organisation_invitations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    pub async fn list_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> Result<Vec<InvitationWithUser>> {
        let invitations = sqlx::query_as::<_, InvitationWithUser>(
            r#"
            SELECT i.id, i.organisation_id, i.user_id, i.response, i.created_at,
                   u.email, u.first_name, u.last_name
            FROM organisation_invitations i
            INNER JOIN users u ON u.id = i.user_id
            WHERE i.organisation_id = $1
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(organisation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    /// Create the membership and drop the invitation atomically.
    /// Fails with `ConstraintViolation` if the invitation is no longer pending.
    pub async fn accept(&self, invitation: &OrganisationInvitation) -> Result<OrgUserLink> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM organisation_invitations WHERE id = $1 AND response = $2",
        )
        .bind(invitation.id)
        .bind(InvitationStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::ConstraintViolation(format!(
                "Invitation {} already resolved",
                invitation.id
            )));
        }

        let link = sqlx::query_as::<_, OrgUserLink>(
            r#"
            INSERT INTO org_user_links (user_id, organisation_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, organisation_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(invitation.user_id)
        .bind(invitation.organisation_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(link)
    }

    /// Mark a pending invitation denied. Returns None if it was already resolved.
    pub async fn deny(&self, id: i64) -> Result<Option<OrganisationInvitation>> {
        let invitation = sqlx::query_as::<_, OrganisationInvitation>(
            r#"
            UPDATE organisation_invitations
            SET response = $2
            WHERE id = $1 AND response = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(InvitationStatus::Denied)
        .bind(InvitationStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM organisation_invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Database, DatabaseConfig, NewCredentials, OrgUserLinkRepository, OrganisationRepository,
        UserRepository,
    };
    use sso_models::{CreateOrganisation, NewUser, Organisation, User};

    async fn fixture(db: &Database) -> (User, Organisation) {
        let user = UserRepository::new(db.pool().clone())
            .create_with_credentials(
                &NewUser::invited(&format!("{}@example.com", Uuid::new_v4())),
                &NewCredentials::default(),
                &[],
            )
            .await
            .unwrap();

        let organisation = OrganisationRepository::new(db.pool().clone())
            .create(&CreateOrganisation {
                name: "Invitation test".to_string(),
                org_type: None,
                thumbnail_url: None,
                banner_url: None,
                extra_fields: None,
                manager_email: None,
            })
            .await
            .unwrap();

        (user, organisation)
    }

    async fn cleanup(db: &Database, user: &User, organisation: &Organisation) {
        OrgUserLinkRepository::new(db.pool().clone())
            .delete(user.id, organisation.id)
            .await
            .unwrap();
        OrganisationRepository::new(db.pool().clone())
            .delete(organisation.id)
            .await
            .unwrap();
        UserRepository::new(db.pool().clone()).delete(user.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_accept_only_once() {
        let db = Database::new(DatabaseConfig::from_env()).await.unwrap();
        let repo = InvitationRepository::new(db.pool().clone());
        let (user, organisation) = fixture(&db).await;

        let invitation = repo.create(organisation.id, user.id).await.unwrap();

        let link = repo.accept(&invitation).await.unwrap();
        assert_eq!(link.user_id, user.id);
        assert_eq!(link.organisation_id, organisation.id);
        assert!(repo.find_pending(user.id, organisation.id).await.unwrap().is_none());

        let again = repo.accept(&invitation).await;
        assert!(matches!(again, Err(DatabaseError::ConstraintViolation(_))));

        cleanup(&db, &user, &organisation).await;
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_denied_invitation_is_final() {
        let db = Database::new(DatabaseConfig::from_env()).await.unwrap();
        let repo = InvitationRepository::new(db.pool().clone());
        let (user, organisation) = fixture(&db).await;

        let invitation = repo.create(organisation.id, user.id).await.unwrap();

        let denied = repo.deny(invitation.id).await.unwrap().unwrap();
        assert_eq!(denied.response, InvitationStatus::Denied);
        assert!(repo.deny(invitation.id).await.unwrap().is_none());

        let accepted = repo.accept(&invitation).await;
        assert!(matches!(accepted, Err(DatabaseError::ConstraintViolation(_))));

        // The denied row stays behind for the organisation's history
        let stored = repo.find_by_id(invitation.id).await.unwrap();
        assert_eq!(stored.response, InvitationStatus::Denied);
        assert!(OrgUserLinkRepository::new(db.pool().clone())
            .find(user.id, organisation.id)
            .await
            .unwrap()
            .is_none());

        assert!(repo.delete(invitation.id).await.unwrap());
        cleanup(&db, &user, &organisation).await;
    }
}
