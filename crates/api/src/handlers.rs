pub mod devices;
pub mod email_template;
pub mod extra_field;
pub mod health;
pub mod info;
pub mod invitation;
pub mod organisation;
pub mod role;
pub mod users;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sso_auth::AuthError;
use sso_database::DatabaseError;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            code: None,
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Bounded limit and non-negative offset
    pub fn window(&self) -> (i64, i64) {
        (self.limit.clamp(1, 1000), self.offset.max(0))
    }
}

/// HTTP status for a domain failure
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::EmailAlreadyPresent
        | AuthError::InvalidPasswordFormat(_)
        | AuthError::ValidationError(_)
        | AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AuthError::OrganisationNotFound
        | AuthError::NotFound(_)
        | AuthError::DatabaseError(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        AuthError::AlreadyMember
        | AuthError::InvitationResolved(_)
        | AuthError::DatabaseError(DatabaseError::DuplicateEntry(_)) => StatusCode::CONFLICT,
        AuthError::NotManager | AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::JwtError(_) => {
            StatusCode::UNAUTHORIZED
        }
        err if err.code().is_some() => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain failure to its JSON error response
pub fn auth_error(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    let data = match &err {
        AuthError::InvitationResolved(id) => Some(serde_json::json!({ "invitation_id": id })),
        _ => None,
    };

    let message = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error: err.kind().to_string(),
            message,
            code: err.code(),
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_are_unauthorized() {
        assert_eq!(status_for(&AuthError::InvalidEmail), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::AccountBlocked), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::PasswordExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AuthError::EmailAlreadyPresent), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AuthError::InvalidPasswordFormat("too short".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&AuthError::OrganisationNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AuthError::AlreadyMember), StatusCode::CONFLICT);
        assert_eq!(status_for(&AuthError::InvitationResolved(4)), StatusCode::CONFLICT);
        assert_eq!(status_for(&AuthError::NotManager), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&AuthError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_carries_code() {
        let (status, Json(body)) = auth_error(AuthError::NotManager);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, Some(12));
        assert_eq!(body.error, "NOT_MANAGER");

        let (_, Json(body)) = auth_error(AuthError::InvitationResolved(9));
        assert_eq!(body.data, Some(serde_json::json!({ "invitation_id": 9 })));
    }

    #[test]
    fn test_pagination_window() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.window(), (100, 0));

        let page = Pagination { limit: 0, offset: -5 };
        assert_eq!(page.window(), (1, 0));
    }
}
