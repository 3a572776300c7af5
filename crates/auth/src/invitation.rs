use crate::error::{AuthError, Result};
use crate::user_service::UserService;
use sso_database::{
    Database, DatabaseError, InvitationRepository, OrgUserLinkRepository, OrganisationRepository,
};
use sso_models::{
    InvitationStatus, InvitationWithOrganisation, InvitationWithUser, OrgUserLink,
    OrganisationInvitation, User,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Result of answering an organisation invitation
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "response", rename_all = "lowercase")]
pub enum InvitationOutcome {
    Accepted { link: OrgUserLink },
    Denied { invitation: OrganisationInvitation },
}

/// Check that `user_id` may answer `invitation` and that it is still open
pub fn ensure_can_respond(invitation: &OrganisationInvitation, user_id: Uuid) -> Result<()> {
    if invitation.user_id != user_id {
        return Err(AuthError::Forbidden(
            "Only the invited user can answer this invitation".to_string(),
        ));
    }

    if !invitation.is_pending() {
        return Err(AuthError::InvitationResolved(invitation.id));
    }

    Ok(())
}

#[derive(Clone)]
pub struct InvitationService {
    invitations: InvitationRepository,
    organisations: OrganisationRepository,
    links: OrgUserLinkRepository,
    users: UserService,
}

impl InvitationService {
    pub fn new(db: &Database, users: UserService) -> Self {
        Self {
            invitations: InvitationRepository::new(db.pool().clone()),
            organisations: OrganisationRepository::new(db.pool().clone()),
            links: OrgUserLinkRepository::new(db.pool().clone()),
            users,
        }
    }

    /// Create a passwordless account and send its activation link
    pub async fn invite_user(&self, email: &str) -> Result<User> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyPresent);
        }

        self.users.invite(email).await
    }

    /// Activate an invited account and set its password
    pub async fn accept_user_invitation(&self, email: &str, code: &str, password: &str) -> Result<User> {
        self.users.activate(email, code, Some(password)).await
    }

    /// Invite an existing or new user to join an organisation
    pub async fn invite_user_to_organisation(
        &self,
        email: &str,
        organisation_id: Uuid,
    ) -> Result<OrganisationInvitation> {
        if !self.organisations.exists(organisation_id).await? {
            return Err(AuthError::OrganisationNotFound);
        }

        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => self.users.invite(email).await?,
        };

        if self.links.find(user.id, organisation_id).await?.is_some() {
            return Err(AuthError::AlreadyMember);
        }

        if let Some(existing) = self.invitations.find_pending(user.id, organisation_id).await? {
            tracing::debug!("Invitation {} already pending for {}", existing.id, email);
            return Ok(existing);
        }

        let invitation = self.invitations.create(organisation_id, user.id).await?;

        tracing::info!(
            "Organisation invitation created: id={}, organisation_id={}, email={}",
            invitation.id,
            organisation_id,
            email
        );

        Ok(invitation)
    }

    /// Accept or deny an invitation. Each invitation is answered once.
    pub async fn respond(
        &self,
        invitation_id: i64,
        user_id: Uuid,
        accept: bool,
    ) -> Result<InvitationOutcome> {
        let invitation = self.invitations.find_by_id(invitation_id).await?;
        ensure_can_respond(&invitation, user_id)?;

        let outcome = match InvitationStatus::from_response(accept) {
            InvitationStatus::Accepted => {
                let link = self
                    .invitations
                    .accept(&invitation)
                    .await
                    .map_err(|e| resolved_or(e, invitation_id))?;
                InvitationOutcome::Accepted { link }
            }
            _ => {
                let invitation = self
                    .invitations
                    .deny(invitation_id)
                    .await?
                    .ok_or(AuthError::InvitationResolved(invitation_id))?;
                InvitationOutcome::Denied { invitation }
            }
        };

        tracing::info!(
            "Invitation answered: id={}, user_id={}, accepted={}",
            invitation_id,
            user_id,
            accept
        );

        Ok(outcome)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<InvitationWithOrganisation>> {
        let invitations = self.invitations.list_for_user(user_id).await?;

        let ids: Vec<Uuid> = invitations.iter().map(|i| i.organisation_id).collect();
        let organisations: HashMap<Uuid, _> = self
            .organisations
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();

        Ok(invitations
            .into_iter()
            .filter_map(|invitation| {
                let organisation = organisations.get(&invitation.organisation_id)?.clone();
                Some(InvitationWithOrganisation {
                    invitation,
                    organisation,
                })
            })
            .collect())
    }

    pub async fn list_for_organisation(&self, organisation_id: Uuid) -> Result<Vec<InvitationWithUser>> {
        if !self.organisations.exists(organisation_id).await? {
            return Err(AuthError::OrganisationNotFound);
        }

        Ok(self.invitations.list_for_organisation(organisation_id).await?)
    }

    pub async fn delete(&self, invitation_id: i64) -> Result<()> {
        if !self.invitations.delete(invitation_id).await? {
            return Err(DatabaseError::not_found("OrganisationInvitation", &invitation_id.to_string()).into());
        }

        tracing::info!("Invitation deleted: id={}", invitation_id);
        Ok(())
    }
}

fn resolved_or(err: DatabaseError, invitation_id: i64) -> AuthError {
    match err {
        DatabaseError::ConstraintViolation(_) => AuthError::InvitationResolved(invitation_id),
        other => AuthError::DatabaseError(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn invitation(user_id: Uuid, response: InvitationStatus) -> OrganisationInvitation {
        OrganisationInvitation {
            id: 7,
            organisation_id: Uuid::new_v4(),
            user_id,
            response,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_invitee_can_answer_pending() {
        let user_id = Uuid::new_v4();
        let invitation = invitation(user_id, InvitationStatus::Pending);

        assert!(ensure_can_respond(&invitation, user_id).is_ok());
    }

    #[test]
    fn test_other_user_cannot_answer() {
        let invitation = invitation(Uuid::new_v4(), InvitationStatus::Pending);

        assert!(matches!(
            ensure_can_respond(&invitation, Uuid::new_v4()),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_answered_invitation_is_final() {
        let user_id = Uuid::new_v4();

        for status in [InvitationStatus::Accepted, InvitationStatus::Denied] {
            let invitation = invitation(user_id, status);
            assert!(matches!(
                ensure_can_respond(&invitation, user_id),
                Err(AuthError::InvitationResolved(7))
            ));
        }
    }

    #[test]
    fn test_concurrent_resolution_maps_to_resolved() {
        let err = resolved_or(DatabaseError::ConstraintViolation("gone".into()), 3);
        assert!(matches!(err, AuthError::InvitationResolved(3)));
    }
}
