use crate::error::{AuthError, Result};
use crate::invitation::InvitationService;
use crate::role_service::{RoleDiff, RoleService};
use sso_database::{
    Database, DatabaseError, OrgUserLinkRepository, OrganisationRepository, RoleHolder,
    RoleRepository,
};
use sso_models::{
    CreateOrganisation, OrgUserLink, Organisation, OrganisationMember, Role, UpdateOrganisation,
    ADMIN_ROLE, ORG_USER_MANAGER_ROLE,
};
use uuid::Uuid;
use validator::Validate;

/// Caller identity as seen by organisation-level checks
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// Only the organisation's manager, or an administrator, may see or change its members
pub fn ensure_manager(organisation: &Organisation, actor: &Actor) -> Result<()> {
    if actor.is_admin() || organisation.manager_id == Some(actor.user_id) {
        Ok(())
    } else {
        Err(AuthError::NotManager)
    }
}

/// Reject role names that the organisation does not offer
pub fn ensure_roles_available(available: &[Role], requested: &[String]) -> Result<()> {
    match requested
        .iter()
        .find(|name| !available.iter().any(|role| &role.name == *name))
    {
        Some(name) => Err(AuthError::BadRequest(format!(
            "Role {} is not available in this organisation",
            name
        ))),
        None => Ok(()),
    }
}

#[derive(Clone)]
pub struct OrganisationService {
    organisations: OrganisationRepository,
    links: OrgUserLinkRepository,
    roles: RoleRepository,
    role_service: RoleService,
    invitations: InvitationService,
}

impl OrganisationService {
    pub fn new(db: &Database, invitations: InvitationService, role_service: RoleService) -> Self {
        Self {
            organisations: OrganisationRepository::new(db.pool().clone()),
            links: OrgUserLinkRepository::new(db.pool().clone()),
            roles: RoleRepository::new(db.pool().clone()),
            role_service,
            invitations,
        }
    }

    /// Create an organisation. A manager email invites that account and makes it the manager.
    pub async fn create(&self, request: CreateOrganisation) -> Result<Organisation> {
        request.validate()?;

        let organisation = self.organisations.create(&request).await?;
        tracing::info!(
            "Organisation created: id={}, name={}",
            organisation.id,
            organisation.name
        );

        let Some(manager_email) = request.manager_email.as_deref() else {
            return Ok(organisation);
        };

        let invitation = self
            .invitations
            .invite_user_to_organisation(manager_email, organisation.id)
            .await?;

        self.role_service
            .add_role_to_user(invitation.user_id, ORG_USER_MANAGER_ROLE)
            .await?;

        let organisation = self
            .organisations
            .set_manager(organisation.id, invitation.user_id)
            .await?;

        tracing::info!(
            "Organisation manager set: organisation_id={}, user_id={}",
            organisation.id,
            invitation.user_id
        );

        Ok(organisation)
    }

    pub async fn get(&self, id: Uuid) -> Result<Organisation> {
        Ok(self.organisations.find_by_id(id).await?)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Organisation>> {
        Ok(self.organisations.list(limit, offset).await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.organisations.count().await?)
    }

    pub async fn update(&self, id: Uuid, update: UpdateOrganisation) -> Result<Organisation> {
        update.validate()?;
        Ok(self.organisations.update(id, &update).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.organisations.delete(id).await? {
            return Err(DatabaseError::not_found("Organisation", &id.to_string()).into());
        }
        tracing::info!("Organisation deleted: id={}", id);
        Ok(())
    }

    async fn existing(&self, id: Uuid) -> Result<Organisation> {
        self.organisations.find_by_id(id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => AuthError::OrganisationNotFound,
            other => other.into(),
        })
    }

    /// Roles offered inside the organisation, by id or by organisation type
    pub async fn available_roles(&self, id: Uuid) -> Result<Vec<Role>> {
        let organisation = self.existing(id).await?;
        Ok(self
            .roles
            .available_for(organisation.id, organisation.org_type.as_deref())
            .await?)
    }

    pub async fn count_users(&self, id: Uuid) -> Result<i64> {
        Ok(self.links.count_for_organisation(id).await?)
    }

    pub async fn users(
        &self,
        actor: &Actor,
        id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrganisationMember>> {
        let organisation = self.existing(id).await?;
        ensure_manager(&organisation, actor)?;

        Ok(self.links.members(id, limit, offset).await?)
    }

    pub async fn add_user(&self, actor: &Actor, id: Uuid, user_id: Uuid) -> Result<OrgUserLink> {
        let organisation = self.existing(id).await?;
        ensure_manager(&organisation, actor)?;

        let link = self.links.create(user_id, id).await.map_err(|e| match e {
            DatabaseError::DuplicateEntry(_) => AuthError::AlreadyMember,
            other => other.into(),
        })?;

        tracing::info!("User added to organisation: organisation_id={}, user_id={}", id, user_id);
        Ok(link)
    }

    pub async fn remove_user(&self, actor: &Actor, id: Uuid, user_id: Uuid) -> Result<()> {
        let organisation = self.existing(id).await?;
        ensure_manager(&organisation, actor)?;

        if !self.links.delete(user_id, id).await? {
            return Err(DatabaseError::not_found("OrgUserLink", &format!("{}/{}", id, user_id)).into());
        }

        tracing::info!("User removed from organisation: organisation_id={}, user_id={}", id, user_id);
        Ok(())
    }

    /// Replace the roles a member holds inside the organisation
    pub async fn set_member_roles(
        &self,
        actor: &Actor,
        id: Uuid,
        user_id: Uuid,
        desired: &[String],
    ) -> Result<RoleDiff> {
        let organisation = self.existing(id).await?;
        ensure_manager(&organisation, actor)?;

        let link = self
            .links
            .find(user_id, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("OrgUserLink", &format!("{}/{}", id, user_id)))?;

        let available = self
            .roles
            .available_for(organisation.id, organisation.org_type.as_deref())
            .await?;
        ensure_roles_available(&available, desired)?;

        self.role_service
            .set_roles(RoleHolder::Link(link.id), desired)
            .await
    }

    pub async fn links_for_user(&self, user_id: Uuid) -> Result<Vec<OrgUserLink>> {
        Ok(self.links.list_for_user(user_id).await?)
    }

    pub async fn organisation_of_link(&self, link_id: i64) -> Result<Organisation> {
        let link = self.links.find_by_id(link_id).await?;
        Ok(self.organisations.find_by_id(link.organisation_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn organisation(manager_id: Option<Uuid>) -> Organisation {
        Organisation {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            org_type: Some("school".to_string()),
            thumbnail_url: None,
            banner_url: None,
            extra_fields: serde_json::json!({}),
            manager_id,
            created_at: Utc::now(),
        }
    }

    fn actor(roles: &[&str]) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn role(name: &str) -> Role {
        Role {
            id: 1,
            name: name.to_string(),
            description: None,
            org_type: Some("school".to_string()),
            org_id: None,
        }
    }

    #[test]
    fn test_manager_check() {
        let manager = actor(&[ORG_USER_MANAGER_ROLE]);
        let org = organisation(Some(manager.user_id));

        assert!(ensure_manager(&org, &manager).is_ok());

        let other_manager = actor(&[ORG_USER_MANAGER_ROLE]);
        let err = ensure_manager(&org, &other_manager).unwrap_err();
        assert_eq!(err.code(), Some(12));

        assert!(ensure_manager(&org, &actor(&[ADMIN_ROLE])).is_ok());
        assert!(ensure_manager(&organisation(None), &other_manager).is_err());
    }

    #[test]
    fn test_roles_must_be_available() {
        let available = vec![role("INSTRUCTOR"), role("STUDENT")];

        assert!(ensure_roles_available(&available, &["INSTRUCTOR".to_string()]).is_ok());
        assert!(ensure_roles_available(&available, &[]).is_ok());
        assert!(matches!(
            ensure_roles_available(&available, &["PRINCIPAL".to_string()]),
            Err(AuthError::BadRequest(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_only_own_manager_changes_membership() {
        use sso_database::{DatabaseConfig, NewCredentials, UserRepository};
        use sso_models::NewUser;

        let db = Database::new(DatabaseConfig::from_env()).await.unwrap();
        let service = crate::test_support::organisation_service(&db);
        let users = UserRepository::new(db.pool().clone());
        let organisations = OrganisationRepository::new(db.pool().clone());
        let links = OrgUserLinkRepository::new(db.pool().clone());

        let mut accounts = Vec::new();
        for _ in 0..2 {
            let user = users
                .create_with_credentials(
                    &NewUser::invited(&format!("{}@example.com", Uuid::new_v4())),
                    &NewCredentials::default(),
                    &[],
                )
                .await
                .unwrap();
            accounts.push(user);
        }
        let (manager, member) = (&accounts[0], &accounts[1]);

        let org = organisations
            .create(&CreateOrganisation {
                name: "Acme".to_string(),
                org_type: None,
                thumbnail_url: None,
                banner_url: None,
                extra_fields: None,
                manager_email: None,
            })
            .await
            .unwrap();
        organisations.set_manager(org.id, manager.id).await.unwrap();

        let owner = Actor {
            user_id: manager.id,
            roles: vec![ORG_USER_MANAGER_ROLE.to_string()],
        };
        let outsider = actor(&[ORG_USER_MANAGER_ROLE]);

        let denied = service.add_user(&outsider, org.id, member.id).await;
        assert!(matches!(denied, Err(AuthError::NotManager)));
        assert!(links.find(member.id, org.id).await.unwrap().is_none());

        service.add_user(&owner, org.id, member.id).await.unwrap();

        let denied = service.remove_user(&outsider, org.id, member.id).await;
        assert!(matches!(denied, Err(AuthError::NotManager)));
        assert!(links.find(member.id, org.id).await.unwrap().is_some());

        service.remove_user(&owner, org.id, member.id).await.unwrap();
        assert!(links.find(member.id, org.id).await.unwrap().is_none());

        organisations.delete(org.id).await.unwrap();
        for user in &accounts {
            users.delete(user.id).await.unwrap();
        }
    }
}
