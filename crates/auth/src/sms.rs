use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum SmsProvider {
    /// Twilio SMS provider
    Twilio {
        account_sid: String,
        auth_token: String,
        from_number: String,
    },
    /// No gateway configured. Messages are only logged.
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: String,
    pub message: String,
}

#[derive(Clone)]
pub struct SmsService {
    provider: SmsProvider,
    client: reqwest::Client,
}

impl SmsService {
    pub fn new(provider: SmsProvider) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
        }
    }

    /// Twilio when `SMS_SID` is set, disabled otherwise
    pub fn from_env() -> Result<Self> {
        let account_sid = std::env::var("SMS_SID").unwrap_or_default();
        if account_sid.is_empty() {
            tracing::warn!("SMS_SID not set, text messages will only be logged");
            return Ok(Self::new(SmsProvider::Disabled));
        }

        let provider = SmsProvider::Twilio {
            account_sid,
            auth_token: std::env::var("SMS_TOKEN")
                .map_err(|_| AuthError::ConfigurationError("SMS_TOKEN not configured".to_string()))?,
            from_number: std::env::var("SMS_NUMBER")
                .map_err(|_| AuthError::ConfigurationError("SMS_NUMBER not configured".to_string()))?,
        };

        Ok(Self::new(provider))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.provider, SmsProvider::Disabled)
    }

    pub async fn send(&self, sms: SmsMessage) -> Result<()> {
        match &self.provider {
            SmsProvider::Twilio {
                account_sid,
                auth_token,
                from_number,
            } => {
                let url = format!(
                    "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
                    account_sid
                );

                let response = self
                    .client
                    .post(&url)
                    .basic_auth(account_sid, Some(auth_token))
                    .form(&[
                        ("To", sms.to.as_str()),
                        ("From", from_number.as_str()),
                        ("Body", sms.message.as_str()),
                    ])
                    .send()
                    .await
                    .map_err(|e| {
                        AuthError::ExternalProviderError(format!("Failed to send SMS via Twilio: {}", e))
                    })?;

                if !response.status().is_success() {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(AuthError::ExternalProviderError(format!(
                        "Twilio API error: {}",
                        error_text
                    )));
                }

                tracing::info!("SMS sent successfully to {}", sms.to);
                Ok(())
            }
            SmsProvider::Disabled => {
                tracing::warn!("SMS gateway disabled, dropping message to {}", sms.to);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_accepts_messages() {
        let service = SmsService::new(SmsProvider::Disabled);
        assert!(!service.is_enabled());

        let result = service
            .send(SmsMessage {
                to: "+33600000000".to_string(),
                message: "Your validation code 123456".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }
}
