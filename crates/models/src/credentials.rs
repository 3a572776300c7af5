use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::Factor;

/// One row per user. Codes are stored as SHA-256 digests.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub user_id: Uuid,
    pub password_hash: Option<String>,
    /// Pending activation code. NULL once the account is activated.
    pub activation_code: Option<String>,
    pub password_reset_code: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    /// Password expiry as unix seconds
    pub valid_until: Option<i64>,
}

impl UserCredentials {
    pub fn is_activated(&self) -> bool {
        self.activation_code.as_deref().map_or(true, str::is_empty)
    }

    pub fn is_password_expired(&self, now: i64) -> bool {
        matches!(self.valid_until, Some(until) if until != 0 && until <= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
    pub factor: Factor,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub otp: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(alias = "oldPassword")]
    pub old_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivationQuery {
    #[validate(email)]
    pub email: String,
    pub otp: String,
}

/// Payload used to activate an invited account and set its first password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub otp: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PhoneFactorRequest {
    #[validate(length(min = 4, max = 32))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequest {
    pub otp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(activation: Option<&str>) -> UserCredentials {
        UserCredentials {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            password_hash: None,
            activation_code: activation.map(str::to_string),
            password_reset_code: None,
            password_reset_expires_at: None,
            valid_until: None,
        }
    }

    #[test]
    fn test_activation_state() {
        assert!(credentials(None).is_activated());
        assert!(credentials(Some("")).is_activated());
        assert!(!credentials(Some("abc")).is_activated());
    }

    #[test]
    fn test_password_reset_request_factor() {
        let req: PasswordResetRequest =
            serde_json::from_str(r#"{"email":"a@b.io","factor":"textsms"}"#).unwrap();
        assert_eq!(req.factor, Factor::TextSms);
    }
}
