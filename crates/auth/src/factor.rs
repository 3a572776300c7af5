use crate::email::EmailTemplateService;
use crate::error::Result;
use crate::sms::{SmsMessage, SmsService};
use sso_database::{Database, UserRepository};
use sso_models::email_template::OTP_TEMPLATE;
use sso_models::Factor;

/// Routes one-time codes to the channel the user picked
#[derive(Clone)]
pub struct AuthFactorSender {
    templates: EmailTemplateService,
    sms: SmsService,
    users: UserRepository,
}

impl AuthFactorSender {
    pub fn new(db: &Database, templates: EmailTemplateService, sms: SmsService) -> Self {
        Self {
            templates,
            sms,
            users: UserRepository::new(db.pool().clone()),
        }
    }

    /// Deliver `otp` to the account identified by `email`
    pub async fn send(&self, factor: Factor, email: &str, otp: &str) -> Result<()> {
        match factor {
            Factor::Email => {
                self.templates
                    .send_template(
                        email,
                        OTP_TEMPLATE,
                        &serde_json::json!({ "otp": otp }),
                        &serde_json::Value::Null,
                    )
                    .await
            }
            Factor::TextSms => {
                let phone = self
                    .users
                    .find_by_email(email)
                    .await?
                    .and_then(|user| user.phone)
                    .filter(|phone| !phone.is_empty());

                match phone {
                    Some(phone) => self.send_sms(&phone, otp).await,
                    None => {
                        tracing::warn!("No phone number for {}, text code not sent", email);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Send a code straight to a phone number
    pub async fn send_sms(&self, phone: &str, otp: &str) -> Result<()> {
        self.sms
            .send(SmsMessage {
                to: phone.to_string(),
                message: format!("Your validation code {}", otp),
            })
            .await
    }
}
