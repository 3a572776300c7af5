use crate::handlers::{auth_error, ApiResult};
use crate::AppState;
use axum::{extract::State, Json};
use sso_models::settings::EmailSettingsInfo;
use sso_models::SsoInfo;
use std::sync::Arc;

/// Public description of the account rules clients need before signing up
/// GET /info/sso
pub async fn sso_info(State(state): State<Arc<AppState>>) -> ApiResult<SsoInfo> {
    let settings = state.users.settings();
    let email = state.templates.email();

    let user_extra_fields = state.extra_fields.list().await.map_err(auth_error)?;

    Ok(Json(SsoInfo {
        settings: settings.sso.clone(),
        email: EmailSettingsInfo {
            host: email.host().to_string(),
            user: email.username().map(str::to_string),
            from: email.from_email().to_string(),
            redirect: settings.redirect_url.clone(),
        },
        token_expires_in: state.tokens.jwt.ttl_seconds(),
        password: settings.password.clone(),
        user_extra_fields,
    }))
}
