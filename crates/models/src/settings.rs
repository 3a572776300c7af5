use serde::{Deserialize, Serialize};

/// Tenant-wide sign-up behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsoSettings {
    /// Anyone may self-register
    pub public_creation: bool,
    pub multi_factor: bool,
    /// New accounts must confirm their email before logging in
    pub account_validation: bool,
    /// Global roles granted to every new account
    pub default_roles: Vec<String>,
}

impl Default for SsoSettings {
    fn default() -> Self {
        Self {
            public_creation: true,
            multi_factor: true,
            account_validation: true,
            default_roles: Vec::new(),
        }
    }
}

/// Password rules applied when a password is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordPolicy {
    pub min: usize,
    pub max: usize,
    /// Requires at least one uppercase and one lowercase letter
    pub upper_letter: bool,
    /// Requires at least one special character
    pub symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min: 8,
            max: 16,
            upper_letter: true,
            symbol: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettingsInfo {
    pub host: String,
    pub user: Option<String>,
    pub from: String,
    pub redirect: String,
}

/// Public server description returned by `/info/sso`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoInfo {
    #[serde(flatten)]
    pub settings: SsoSettings,
    pub email: EmailSettingsInfo,
    pub token_expires_in: i64,
    pub password: PasswordPolicy,
    pub user_extra_fields: Vec<crate::ExtraField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: SsoSettings =
            serde_json::from_str(r#"{"publicCreation":false,"defaultRoles":["USER"]}"#).unwrap();
        assert!(!settings.public_creation);
        assert!(settings.account_validation);
        assert_eq!(settings.default_roles, vec!["USER".to_string()]);
    }

    #[test]
    fn test_password_policy_defaults() {
        let policy: PasswordPolicy = serde_json::from_str(r#"{"symbol":true}"#).unwrap();
        assert_eq!(policy.min, 8);
        assert_eq!(policy.max, 16);
        assert!(policy.upper_letter);
        assert!(policy.symbol);
    }
}
