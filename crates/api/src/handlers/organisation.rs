use crate::handlers::{auth_error, ApiResult, MessageResponse, Pagination};
use crate::middleware::AuthUser;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use sso_auth::RoleDiff;
use sso_models::organisation::{AddMemberQuery, SetMemberRoles};
use sso_models::user::CountResponse;
use sso_models::{
    CreateOrganisation, OrgUserLink, Organisation, OrganisationMember, Role, UpdateOrganisation,
};
use std::sync::Arc;
use uuid::Uuid;

/// POST /organisations
pub async fn create_organisation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrganisation>,
) -> ApiResult<Organisation> {
    let organisation = state
        .organisations
        .create(request)
        .await
        .map_err(auth_error)?;

    Ok(Json(organisation))
}

/// GET /organisations
pub async fn list_organisations(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Organisation>> {
    let (limit, offset) = page.window();
    let organisations = state
        .organisations
        .list(limit, offset)
        .await
        .map_err(auth_error)?;

    Ok(Json(organisations))
}

/// GET /organisations/:id
pub async fn get_organisation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Organisation> {
    let organisation = state.organisations.get(id).await.map_err(auth_error)?;
    Ok(Json(organisation))
}

/// PATCH /organisations/:id
pub async fn update_organisation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateOrganisation>,
) -> ApiResult<Organisation> {
    let organisation = state
        .organisations
        .update(id, update)
        .await
        .map_err(auth_error)?;

    Ok(Json(organisation))
}

/// DELETE /organisations/:id
pub async fn delete_organisation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.organisations.delete(id).await.map_err(auth_error)?;
    Ok(Json(MessageResponse::new("Organisation deleted")))
}

/// GET /organisations/:id/role
pub async fn available_roles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Role>> {
    let roles = state
        .organisations
        .available_roles(id)
        .await
        .map_err(auth_error)?;

    Ok(Json(roles))
}

/// GET /organisations/:id/user/count
pub async fn count_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<CountResponse> {
    let count = state
        .organisations
        .count_users(id)
        .await
        .map_err(auth_error)?;

    Ok(Json(CountResponse { count }))
}

/// Members with their roles. Only the manager of the organisation or an admin.
/// GET /organisations/:id/user
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<OrganisationMember>> {
    let (limit, offset) = page.window();
    let members = state
        .organisations
        .users(&auth_user.actor(), id, limit, offset)
        .await
        .map_err(auth_error)?;

    Ok(Json(members))
}

/// POST /organisations/:id/user?userid=..
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<AddMemberQuery>,
) -> ApiResult<OrgUserLink> {
    let link = state
        .organisations
        .add_user(&auth_user.actor(), id, query.user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(link))
}

/// DELETE /organisations/:id/user/:user_id
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<MessageResponse> {
    state
        .organisations
        .remove_user(&auth_user.actor(), id, user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Member removed")))
}

/// PUT /organisations/:id/user/:user_id/roles
pub async fn set_member_roles(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SetMemberRoles>,
) -> ApiResult<RoleDiff> {
    let diff = state
        .organisations
        .set_member_roles(&auth_user.actor(), id, user_id, &request.roles)
        .await
        .map_err(auth_error)?;

    Ok(Json(diff))
}
