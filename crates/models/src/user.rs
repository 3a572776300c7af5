use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_USER_TYPE: &str = "user";
pub const DEVICE_USER_TYPE: &str = "device";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,

    /// "user" for people, "device" for machine accounts
    pub user_type: String,

    pub email: String,
    pub phone: Option<String>,

    #[serde(skip_serializing)]
    pub phone_activation_code: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub thumbnail: Option<String>,

    pub blocked: bool,

    /// Account expiry as unix seconds. NULL or 0 means no expiry.
    pub valid_until: Option<i64>,

    pub extra_fields: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.split('@').next().unwrap_or_default().to_string(),
        }
    }

    pub fn is_device(&self) -> bool {
        self.user_type == DEVICE_USER_TYPE
    }

    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.valid_until, Some(until) if until != 0 && until <= now)
    }
}

/// Row written when creating an account. Credentials are created alongside.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_type: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub thumbnail: Option<String>,
    pub extra_fields: serde_json::Value,
}

impl NewUser {
    pub fn invited(email: &str) -> Self {
        Self {
            user_type: DEFAULT_USER_TYPE.to_string(),
            email: email.to_string(),
            phone: None,
            first_name: None,
            last_name: None,
            thumbnail: None,
            extra_fields: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Self-registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    pub password: String,

    #[serde(alias = "firstname")]
    #[validate(length(max = 255))]
    pub first_name: Option<String>,

    #[serde(alias = "lastname")]
    #[validate(length(max = 255))]
    pub last_name: Option<String>,

    #[serde(alias = "telephone")]
    pub phone: Option<String>,

    pub thumbnail: Option<String>,

    #[serde(default, alias = "extraFields")]
    pub extra_fields: serde_json::Map<String, serde_json::Value>,
}

/// Fields a user may change on their own account
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfile {
    #[serde(alias = "firstname")]
    #[validate(length(max = 255))]
    pub first_name: Option<String>,

    #[serde(alias = "lastname")]
    #[validate(length(max = 255))]
    pub last_name: Option<String>,

    pub thumbnail: Option<String>,

    #[serde(alias = "extraFields")]
    pub extra_fields: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Admin update of any account. `roles` replaces the global role set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,

    #[serde(alias = "type")]
    pub user_type: Option<String>,

    pub phone: Option<String>,

    #[serde(alias = "firstname")]
    pub first_name: Option<String>,

    #[serde(alias = "lastname")]
    pub last_name: Option<String>,

    pub thumbnail: Option<String>,

    pub blocked: Option<bool>,

    #[serde(alias = "validUntil")]
    pub valid_until: Option<i64>,

    #[serde(alias = "extraFields")]
    pub extra_fields: Option<serde_json::Value>,

    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceLoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,

    /// Token lifetime in seconds, defaults to the server TTL. At most ten years.
    #[validate(range(min = 1, max = 315360000))]
    pub ttl: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub telephone: Option<String>,
    pub thumbnail: Option<String>,
    pub extra_fields: serde_json::Value,
    pub roles: Vec<String>,
    pub organisations: Vec<Uuid>,
}

/// Admin listing row. Credential material is reduced to flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
    pub activated: bool,
    pub has_password: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            user_type: DEFAULT_USER_TYPE.to_string(),
            email: "jane.doe@example.com".to_string(),
            phone: None,
            phone_activation_code: None,
            first_name: None,
            last_name: None,
            thumbnail: None,
            blocked: false,
            valid_until: None,
            extra_fields: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        let mut u = user();
        assert_eq!(u.display_name(), "jane.doe");

        u.first_name = Some("Jane".to_string());
        assert_eq!(u.display_name(), "Jane");

        u.last_name = Some("Doe".to_string());
        assert_eq!(u.display_name(), "Jane Doe");
    }

    #[test]
    fn test_expiry_zero_means_never() {
        let mut u = user();
        assert!(!u.is_expired(1_000));

        u.valid_until = Some(0);
        assert!(!u.is_expired(1_000));

        u.valid_until = Some(1_000);
        assert!(u.is_expired(1_000));
        assert!(!u.is_expired(999));
    }

    #[test]
    fn test_register_request_accepts_legacy_names() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "a@b.io",
            "password": "Secret123",
            "firstname": "Ada",
            "telephone": "+33600000000"
        }))
        .unwrap();

        assert_eq!(req.first_name.as_deref(), Some("Ada"));
        assert_eq!(req.phone.as_deref(), Some("+33600000000"));
        assert!(req.extra_fields.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_device_ttl_bounds() {
        let request = |ttl: i64| DeviceLoginRequest {
            email: "sensor@example.com".to_string(),
            password: "Secret123".to_string(),
            ttl: Some(ttl),
        };

        assert!(request(86_400).validate().is_ok());
        assert!(request(315_360_000).validate().is_ok());
        assert!(request(0).validate().is_err());
        assert!(request(315_360_001).validate().is_err());
        assert!(request(1_000_000_000_000_000_000).validate().is_err());
    }
}
