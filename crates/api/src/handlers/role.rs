use crate::handlers::{auth_error, ApiResult, MessageResponse, Pagination};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use sso_models::user::CountResponse;
use sso_models::{NewRole, Role, UpdateRole};
use std::sync::Arc;

/// POST /roles
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewRole>,
) -> ApiResult<Role> {
    let role = state.roles.create(request).await.map_err(auth_error)?;
    Ok(Json(role))
}

/// GET /roles
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Role>> {
    let (limit, offset) = page.window();
    let roles = state.roles.list(limit, offset).await.map_err(auth_error)?;
    Ok(Json(roles))
}

/// GET /roles/count
pub async fn count_roles(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = state.roles.count().await.map_err(auth_error)?;
    Ok(Json(CountResponse { count }))
}

/// GET /roles/:id
pub async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Role> {
    let role = state.roles.get(id).await.map_err(auth_error)?;
    Ok(Json(role))
}

/// PATCH /roles/:id
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<UpdateRole>,
) -> ApiResult<Role> {
    let role = state.roles.update(id, update).await.map_err(auth_error)?;
    Ok(Json(role))
}

/// DELETE /roles/:id
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    state.roles.delete(id).await.map_err(auth_error)?;
    Ok(Json(MessageResponse::new("Role deleted")))
}
