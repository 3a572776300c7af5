use crate::handlers::{auth_error, ApiResult, MessageResponse, Pagination};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use sso_models::email_template::{RenderTemplateRequest, SendTemplateRequest};
use sso_models::user::CountResponse;
use sso_models::{EmailTemplate, NewEmailTemplate, RenderedEmail, UpdateEmailTemplate};
use std::sync::Arc;
use validator::Validate;

/// POST /email-templates
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewEmailTemplate>,
) -> ApiResult<EmailTemplate> {
    let template = state.templates.create(request).await.map_err(auth_error)?;
    tracing::info!("Email template created: key={}", template.key);
    Ok(Json(template))
}

/// GET /email-templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<EmailTemplate>> {
    let (limit, offset) = page.window();
    let templates = state
        .templates
        .list(limit, offset)
        .await
        .map_err(auth_error)?;

    Ok(Json(templates))
}

/// GET /email-templates/count
pub async fn count_templates(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = state.templates.count().await.map_err(auth_error)?;
    Ok(Json(CountResponse { count }))
}

/// GET /email-templates/:key
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<EmailTemplate> {
    let template = state.templates.get(&key).await.map_err(auth_error)?;
    Ok(Json(template))
}

/// PATCH /email-templates/:key
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(update): Json<UpdateEmailTemplate>,
) -> ApiResult<EmailTemplate> {
    let template = state
        .templates
        .update(&key, update)
        .await
        .map_err(auth_error)?;

    Ok(Json(template))
}

/// DELETE /email-templates/:key
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<MessageResponse> {
    state.templates.delete(&key).await.map_err(auth_error)?;
    Ok(Json(MessageResponse::new("Template deleted")))
}

/// Preview a template with the given data
/// POST /email-templates/render
pub async fn render_template(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderTemplateRequest>,
) -> ApiResult<RenderedEmail> {
    let rendered = state
        .templates
        .render(&request.key, &request.data, &request.title_data)
        .await
        .map_err(auth_error)?;

    Ok(Json(rendered))
}

/// POST /email-templates/sender
pub async fn send_template(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendTemplateRequest>,
) -> ApiResult<MessageResponse> {
    request.validate().map_err(|e| auth_error(e.into()))?;

    state
        .templates
        .send_template(&request.to, &request.key, &request.data, &request.title_data)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse::new(format!("Email sent to {}", request.to))))
}
