use crate::handlers::{auth_error, ApiResult, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use sso_auth::TokenType;
use sso_models::user::{DeviceLoginRequest, TokenResponse};
use std::sync::Arc;
use validator::Validate;

/// Login for machine accounts. The token lifetime may be chosen by the caller.
/// POST /devices/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeviceLoginRequest>,
) -> ApiResult<TokenResponse> {
    request
        .validate()
        .map_err(|e| auth_error(e.into()))?;

    let user = state
        .users
        .verify_credentials(&request.email, &request.password)
        .await
        .map_err(auth_error)?;

    if !user.is_device() {
        tracing::warn!("Device login refused for non-device account id={}", user.id);
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not_a_device", "Account is not a device")),
        ));
    }

    let token = state
        .tokens
        .issue(&user, TokenType::Device, request.ttl)
        .await
        .map_err(auth_error)?;

    tracing::info!("Device logged in: id={}", user.id);
    Ok(Json(TokenResponse { token }))
}
