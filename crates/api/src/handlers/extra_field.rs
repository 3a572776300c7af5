use crate::handlers::{auth_error, ApiResult, MessageResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use sso_models::{ExtraField, NewExtraField};
use std::sync::Arc;

/// GET /extra-fields
pub async fn list_fields(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ExtraField>> {
    let fields = state.extra_fields.list().await.map_err(auth_error)?;
    Ok(Json(fields))
}

/// POST /extra-fields
pub async fn create_field(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewExtraField>,
) -> ApiResult<ExtraField> {
    let field = state
        .extra_fields
        .create(request)
        .await
        .map_err(auth_error)?;

    Ok(Json(field))
}

/// DELETE /extra-fields/:id
pub async fn delete_field(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    state.extra_fields.delete(id).await.map_err(auth_error)?;
    Ok(Json(MessageResponse::new("Extra field deleted")))
}
