use crate::error::{AuthError, Result};
use serde::de::DeserializeOwned;
use sso_models::{PasswordPolicy, SsoSettings};

/// Account rules shared by the user-facing services
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub sso: SsoSettings,
    pub password: PasswordPolicy,
    /// Front-end page receiving activation and invitation links
    pub redirect_url: String,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            sso: SsoSettings::default(),
            password: PasswordPolicy::default(),
            redirect_url: "http://localhost:3000".to_string(),
        }
    }
}

impl AccountSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            sso: parse_json_var("SSO_SETTINGS", std::env::var("SSO_SETTINGS").ok())?,
            password: parse_json_var("PASSWORD_CONFIG", std::env::var("PASSWORD_CONFIG").ok())?,
            redirect_url: std::env::var("EMAIL_REDIRECT")
                .unwrap_or_else(|_| Self::default().redirect_url),
        })
    }
}

/// Parse an optional JSON setting, falling back to the type's defaults when unset
pub fn parse_json_var<T: DeserializeOwned + Default>(name: &str, raw: Option<String>) -> Result<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| AuthError::ConfigurationError(format!("{} is not valid JSON: {}", name, e))),
    }
}

/// Link sent by email for account activation or invitation
pub fn action_url(redirect_url: &str, otp: &str, email: &str, action: &str) -> String {
    let separator = if redirect_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}otp={}&email={}&action={}",
        redirect_url,
        separator,
        urlencoding::encode(otp),
        urlencoding::encode(email),
        action
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_settings_use_defaults() {
        let sso: SsoSettings = parse_json_var("SSO_SETTINGS", None).unwrap();
        assert_eq!(sso, SsoSettings::default());

        let policy: PasswordPolicy = parse_json_var("PASSWORD_CONFIG", Some("  ".into())).unwrap();
        assert_eq!(policy, PasswordPolicy::default());
    }

    #[test]
    fn test_malformed_settings_are_rejected() {
        let result: Result<SsoSettings> = parse_json_var("SSO_SETTINGS", Some("{oops".into()));
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }

    #[test]
    fn test_action_url() {
        assert_eq!(
            action_url("https://app.local/activate", "123456", "a+b@x.io", "confirm"),
            "https://app.local/activate?otp=123456&email=a%2Bb%40x.io&action=confirm"
        );
        assert_eq!(
            action_url("https://app.local/?lang=fr", "1", "a@x.io", "validate"),
            "https://app.local/?lang=fr&otp=1&email=a%40x.io&action=validate"
        );
    }
}
