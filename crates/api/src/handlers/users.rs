use crate::handlers::{auth_error, ApiResult, MessageResponse, Pagination};
use crate::middleware::AuthUser;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use sso_auth::TokenType;
use sso_models::credentials::{
    ActivationQuery, OtpRequest, PasswordResetConfirm, PasswordResetRequest, PhoneFactorRequest,
    UpdatePasswordRequest,
};
use sso_models::user::{CountResponse, LoginRequest, RegisterRequest, TokenResponse};
use sso_models::{OrgUserLink, Organisation, UpdateProfile, UpdateUser, User, UserProfile, UserWithRoles};
use std::sync::Arc;
use uuid::Uuid;

/// Self-registration
/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<User> {
    let user = state.users.create_user(request).await.map_err(auth_error)?;
    Ok(Json(user))
}

/// Email and password login
/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let user = state
        .users
        .verify_credentials(&request.email, &request.password)
        .await
        .map_err(auth_error)?;

    let token = state
        .tokens
        .issue(&user, TokenType::Access, None)
        .await
        .map_err(auth_error)?;

    tracing::info!("User logged in: id={}", user.id);
    Ok(Json(TokenResponse { token }))
}

/// GET /users/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<TokenResponse> {
    let token = state
        .tokens
        .refresh(&auth_user.claims)
        .await
        .map_err(auth_error)?;

    Ok(Json(TokenResponse { token }))
}

/// GET /users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<UserProfile> {
    let profile = state
        .users
        .profile(auth_user.user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(profile))
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(update): Json<UpdateProfile>,
) -> ApiResult<UserProfile> {
    let profile = state
        .users
        .update_profile(auth_user.user_id, update)
        .await
        .map_err(auth_error)?;

    Ok(Json(profile))
}

/// DELETE /users/me
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .delete(auth_user.user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Account deleted")))
}

/// PATCH /users/me/credentials
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<UpdatePasswordRequest>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .update_password(auth_user.user_id, &request.old_password, &request.new_password)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// Send a reset code by email or text message
/// PATCH /users/credentials/reset
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetRequest>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .request_password_reset(&request.email, request.factor)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Reset code sent")))
}

/// PATCH /users/credentials/otp
pub async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordResetConfirm>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .confirm_password_reset(&request.email, &request.otp, &request.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// GET /users/credentials/validate?email=..&otp=..
pub async fn validate_activation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivationQuery>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .validate_activation_code(&query.email, &query.otp)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Account activated")))
}

/// PATCH /users/factor/sms
pub async fn set_phone_factor(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<PhoneFactorRequest>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .set_phone_factor(auth_user.user_id, &request.phone)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Confirmation code sent")))
}

/// PATCH /users/factor/sms/validate
pub async fn confirm_phone_factor(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<OtpRequest>,
) -> ApiResult<MessageResponse> {
    state
        .users
        .confirm_phone_factor(auth_user.user_id, &request.otp)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new("Phone confirmed")))
}

/// GET /users/count
pub async fn count_users(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = state.users.count().await.map_err(auth_error)?;
    Ok(Json(CountResponse { count }))
}

/// GET /users?limit=..&offset=..
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<UserWithRoles>> {
    let (limit, offset) = page.window();
    let users = state.users.list(limit, offset).await.map_err(auth_error)?;
    Ok(Json(users))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<UserWithRoles> {
    let user = state.users.get(user_id).await.map_err(auth_error)?;
    Ok(Json(user))
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(update): Json<UpdateUser>,
) -> ApiResult<UserWithRoles> {
    let user = state
        .users
        .update(user_id, update)
        .await
        .map_err(auth_error)?;

    tracing::info!("User {} updated by admin {}", user_id, auth_user.user_id);
    Ok(Json(user))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.users.delete(user_id).await.map_err(auth_error)?;
    Ok(Json(MessageResponse::new("User deleted")))
}

/// GET /users/:id/org-user-links
pub async fn user_links(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Vec<OrgUserLink>> {
    let links = state
        .organisations
        .links_for_user(user_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(links))
}

/// GET /org-user-links/:id/organisation
pub async fn link_organisation(
    State(state): State<Arc<AppState>>,
    Path(link_id): Path<i64>,
) -> ApiResult<Organisation> {
    let organisation = state
        .organisations
        .organisation_of_link(link_id)
        .await
        .map_err(auth_error)?;

    Ok(Json(organisation))
}
