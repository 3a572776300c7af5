use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const INVITE_USER_TEMPLATE: &str = "INVITE_USER";
pub const CONFIRM_ACCOUNT_TEMPLATE: &str = "CONFIRM_ACCOUNT";
pub const OTP_TEMPLATE: &str = "OTP";

lazy_static::lazy_static! {
    static ref TEMPLATE_KEY_REGEX: regex::Regex = regex::Regex::new(r"^[A-Z0-9_]+$").unwrap();
}

/// Notification template keyed by a stable identifier.
/// `title` and `template` use `{{=it.field}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailTemplate {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub template: String,
    /// Names of the values the template expects
    pub args: serde_json::Value,
}

pub fn is_valid_template_key(key: &str) -> bool {
    TEMPLATE_KEY_REGEX.is_match(key)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewEmailTemplate {
    #[validate(length(min = 1, max = 64))]
    pub key: String,

    #[validate(length(min = 1))]
    pub title: String,

    pub description: Option<String>,

    pub template: String,

    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEmailTemplate {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTemplateRequest {
    pub key: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, alias = "titleData")]
    pub title_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendTemplateRequest {
    #[validate(email)]
    pub to: String,
    pub key: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, alias = "titleData")]
    pub title_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_keys() {
        assert!(is_valid_template_key(INVITE_USER_TEMPLATE));
        assert!(is_valid_template_key(CONFIRM_ACCOUNT_TEMPLATE));
        assert!(is_valid_template_key("OTP_V2"));
        assert!(!is_valid_template_key("invite user"));
        assert!(!is_valid_template_key(""));
    }
}
