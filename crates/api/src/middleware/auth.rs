use crate::handlers::{auth_error, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use sso_auth::{organisation_service::Actor, Claims};
use sso_models::{ADMIN_ROLE, ORG_USER_MANAGER_ROLE};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller, taken from a validated bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub claims: Claims,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            roles: self.roles.clone(),
        }
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = sso_auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            claims,
        })
    }
}

/// Extract the token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "missing_auth_header",
                    "Authorization header is required",
                )),
            )
        })?
        .to_str()
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "invalid_auth_header",
                    "Invalid Authorization header format",
                )),
            )
        })?;

    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "invalid_auth_scheme",
                "Authorization header must use Bearer scheme",
            )),
        )),
    }
}

/// Validate the bearer token and build the caller context
pub fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthUser, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(headers)?;

    state
        .tokens
        .validate(&token)
        .and_then(AuthUser::try_from)
        .map_err(|e| {
            tracing::warn!("Token validation failed: {}", e);
            auth_error(e)
        })
}

/// Reject callers holding none of `roles`
pub fn ensure_any_role(
    user: &AuthUser,
    roles: &[&str],
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if roles.iter().any(|role| user.has_role(role)) {
        return Ok(());
    }

    tracing::warn!("Access denied for user_id={}, needs one of {:?}", user.user_id, roles);
    Err((
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::new(
            "insufficient_permissions",
            &format!("This action requires one of the roles: {}", roles.join(", ")),
        )),
    ))
}

async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    mut request: Request,
    next: Next,
    roles: &[&str],
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let user = authenticate(state, headers)?;
    if !roles.is_empty() {
        ensure_any_role(&user, roles)?;
    }

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Middleware to require authentication
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    authorize(&state, &headers, request, next, &[]).await
}

/// Middleware to require the ADMIN role
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    authorize(&state, &headers, request, next, &[ADMIN_ROLE]).await
}

/// Middleware to require ADMIN or ORG_USER_MANAGER
pub async fn require_org_manager(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    authorize(&state, &headers, request, next, &[ADMIN_ROLE, ORG_USER_MANAGER_ROLE]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(roles: &[&str]) -> AuthUser {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
            iat: 0,
            jti: Uuid::new_v4().to_string(),
            token_type: sso_auth::TokenType::Access,
        };
        AuthUser::try_from(claims).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            extract_bearer_token(&headers).unwrap_err().0,
            StatusCode::UNAUTHORIZED
        );

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_role_guard() {
        let manager = user(&[ORG_USER_MANAGER_ROLE]);
        assert!(ensure_any_role(&manager, &[ADMIN_ROLE, ORG_USER_MANAGER_ROLE]).is_ok());

        let (status, _) = ensure_any_role(&manager, &[ADMIN_ROLE]).unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!manager.is_admin());
    }

    #[test]
    fn test_claims_with_bad_subject_are_rejected() {
        let mut claims = user(&[]).claims;
        claims.sub = "not-a-uuid".to_string();
        assert!(AuthUser::try_from(claims).is_err());
    }
}
