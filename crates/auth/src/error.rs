use sso_database::DatabaseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("No credentials for this account")]
    NoCredentials,

    #[error("Email not validated")]
    EmailNotValidated,

    #[error("Account already validated")]
    AlreadyValidated,

    #[error("Account blocked")]
    AccountBlocked,

    #[error("Account expired")]
    AccountExpired,

    #[error("Password expired")]
    PasswordExpired,

    #[error("Email already present")]
    EmailAlreadyPresent,

    #[error("Organisation does not exist")]
    OrganisationNotFound,

    #[error("User already belongs to this organisation")]
    AlreadyMember,

    #[error("Invalid password format: {0}")]
    InvalidPasswordFormat(String),

    #[error("Not the manager of this organisation")]
    NotManager,

    #[error("Invitation {0} was already answered")]
    InvitationResolved(i64),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External provider error: {0}")]
    ExternalProviderError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AuthError {
    /// Stable numeric code for account and credential failures.
    /// Clients branch on this value rather than on the message.
    pub fn code(&self) -> Option<u16> {
        let code = match self {
            AuthError::InvalidEmail => 0,
            AuthError::InvalidPassword => 1,
            AuthError::NoCredentials => 2,
            AuthError::EmailNotValidated => 3,
            AuthError::AlreadyValidated => 4,
            AuthError::AccountBlocked => 5,
            AuthError::AccountExpired => 6,
            AuthError::PasswordExpired => 7,
            AuthError::EmailAlreadyPresent => 8,
            AuthError::OrganisationNotFound => 9,
            AuthError::AlreadyMember => 10,
            AuthError::InvalidPasswordFormat(_) => 11,
            AuthError::NotManager => 12,
            _ => return None,
        };

        Some(code)
    }

    /// Short machine-readable identifier used in error responses
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::InvalidPassword => "INVALID_PASSWORD",
            AuthError::NoCredentials => "NO_CREDENTIALS",
            AuthError::EmailNotValidated => "NOT_VALIDATE_EMAIL",
            AuthError::AlreadyValidated => "ALREADY_VALIDATE",
            AuthError::AccountBlocked => "BLOCKED_ACCOUNT",
            AuthError::AccountExpired => "EXPIRED_ACCOUNT",
            AuthError::PasswordExpired => "EXPIRED_PASSWORD",
            AuthError::EmailAlreadyPresent => "EMAIL_ALREADY_PRESENT",
            AuthError::OrganisationNotFound => "ORGANISATION_DONT_EXIST",
            AuthError::AlreadyMember => "USER_ALREADY_ORGANISATION",
            AuthError::InvalidPasswordFormat(_) => "INVALID_PASSWORD_FORMAT",
            AuthError::NotManager => "NOT_MANAGER",
            AuthError::InvitationResolved(_) => "invitation_resolved",
            AuthError::InvalidToken(_) | AuthError::TokenExpired | AuthError::JwtError(_) => {
                "invalid_token"
            }
            AuthError::DatabaseError(DatabaseError::NotFound(_)) | AuthError::NotFound(_) => {
                "not_found"
            }
            AuthError::DatabaseError(DatabaseError::DuplicateEntry(_)) => "already_exists",
            AuthError::DatabaseError(_) => "database_error",
            AuthError::ValidationError(_) | AuthError::BadRequest(_) => "bad_request",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::ExternalProviderError(_) => "delivery_failed",
            AuthError::PasswordHashError(_)
            | AuthError::Internal(_)
            | AuthError::ConfigurationError(_) => "internal_error",
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHashError(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AuthError::PasswordHashError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::JwtError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(err.to_string())
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(DatabaseError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_error_codes() {
        assert_eq!(AuthError::InvalidEmail.code(), Some(0));
        assert_eq!(AuthError::EmailNotValidated.code(), Some(3));
        assert_eq!(AuthError::AccountExpired.code(), Some(6));
        assert_eq!(AuthError::InvalidPasswordFormat("x".into()).code(), Some(11));
        assert_eq!(AuthError::NotManager.code(), Some(12));
        assert_eq!(AuthError::TokenExpired.code(), None);
    }

    #[test]
    fn test_database_not_found_kind() {
        let err = AuthError::from(DatabaseError::not_found("Role", "3"));
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.code(), None);
    }
}
