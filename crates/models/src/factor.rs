use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Channel used to deliver a one-time code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Email,
    #[serde(alias = "sms")]
    TextSms,
}

impl Factor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Email => "email",
            Factor::TextSms => "textsms",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Factor::Email),
            "textsms" | "sms" => Ok(Factor::TextSms),
            other => Err(format!("Unknown auth factor: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_factor() {
        assert_eq!("email".parse::<Factor>().unwrap(), Factor::Email);
        assert_eq!("TextSms".parse::<Factor>().unwrap(), Factor::TextSms);
        assert_eq!("sms".parse::<Factor>().unwrap(), Factor::TextSms);
        assert!("pigeon".parse::<Factor>().is_err());
    }

    #[test]
    fn test_unknown_factor_is_rejected_by_serde() {
        assert!(serde_json::from_str::<Factor>(r#""fax""#).is_err());
        assert_eq!(serde_json::to_string(&Factor::TextSms).unwrap(), r#""textsms""#);
    }
}
