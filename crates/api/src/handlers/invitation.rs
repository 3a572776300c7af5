use crate::handlers::{auth_error, ApiResult, MessageResponse};
use crate::middleware::AuthUser;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use sso_auth::InvitationOutcome;
use sso_models::credentials::AcceptInvitationRequest;
use sso_models::invitation::{InvitationResponseQuery, InviteQuery, InviteUserRequest};
use sso_models::{InvitationWithOrganisation, InvitationWithUser, OrganisationInvitation, User};
use std::sync::Arc;
use uuid::Uuid;

/// Create a passwordless account and mail its activation link (Admin only)
/// POST /invitation/users
pub async fn invite_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<InviteUserRequest>,
) -> ApiResult<User> {
    let user = state
        .invitations
        .invite_user(&request.email)
        .await
        .map_err(auth_error)?;

    tracing::info!("User {} invited by {}", user.email, auth_user.user_id);
    Ok(Json(user))
}

/// Set the first password of an invited account (public)
/// PATCH /invitation/users
pub async fn accept_user_invitation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AcceptInvitationRequest>,
) -> ApiResult<User> {
    let user = state
        .invitations
        .accept_user_invitation(&request.email, &request.otp, &request.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(user))
}

/// Invite a user into an organisation (Admin or organisation manager)
/// POST /invitation/org/:id?email=..
pub async fn invite_to_organisation(
    State(state): State<Arc<AppState>>,
    Path(organisation_id): Path<Uuid>,
    Query(query): Query<InviteQuery>,
) -> ApiResult<OrganisationInvitation> {
    let invitation = state
        .invitations
        .invite_user_to_organisation(&query.email, organisation_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(invitation))
}

/// Accept or deny an invitation addressed to the caller
/// PATCH /invitation/org/:id?response=true|false
pub async fn respond(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(invitation_id): Path<i64>,
    Query(query): Query<InvitationResponseQuery>,
) -> ApiResult<InvitationOutcome> {
    let outcome = state
        .invitations
        .respond(invitation_id, auth_user.user_id, query.response)
        .await
        .map_err(auth_error)?;

    Ok(Json(outcome))
}

/// GET /invitation/org/me
pub async fn my_invitations(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<InvitationWithOrganisation>> {
    let invitations = state
        .invitations
        .list_for_user(auth_user.user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(invitations))
}

/// GET /invitation/org/:id
pub async fn organisation_invitations(
    State(state): State<Arc<AppState>>,
    Path(organisation_id): Path<Uuid>,
) -> ApiResult<Vec<InvitationWithUser>> {
    let invitations = state
        .invitations
        .list_for_organisation(organisation_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(invitations))
}

/// DELETE /invitation/org/:id
pub async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    Path(invitation_id): Path<i64>,
) -> ApiResult<MessageResponse> {
    state
        .invitations
        .delete(invitation_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Invitation deleted")))
}
