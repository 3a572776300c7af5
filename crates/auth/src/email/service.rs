use crate::error::{AuthError, Result};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum EmailProvider {
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        from_email: String,
        from_name: String,
    },
    MailHog {
        host: String,
        port: u16,
        from_email: String,
        from_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

#[derive(Clone)]
pub struct EmailService {
    provider: EmailProvider,
}

impl EmailService {
    pub fn new(provider: EmailProvider) -> Self {
        Self { provider }
    }

    pub fn from_env() -> Result<Self> {
        let email_provider = std::env::var("EMAIL_PROVIDER")
            .or_else(|_| std::env::var("EMAIL_TYPE"))
            .unwrap_or_else(|_| "mailhog".to_string());

        let from_name = std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "SSO".to_string());

        let provider = match email_provider.to_lowercase().as_str() {
            "mailhog" => EmailProvider::MailHog {
                host: std::env::var("EMAIL_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: std::env::var("EMAIL_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1025),
                from_email: std::env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "noreply@sso.local".to_string()),
                from_name,
            },
            "smtp" => EmailProvider::Smtp {
                host: std::env::var("EMAIL_HOST")
                    .map_err(|_| AuthError::ConfigurationError("EMAIL_HOST not configured".to_string()))?,
                port: std::env::var("EMAIL_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: std::env::var("EMAIL_USER").ok(),
                password: std::env::var("EMAIL_PASSWORD").ok(),
                from_email: std::env::var("EMAIL_FROM")
                    .map_err(|_| AuthError::ConfigurationError("EMAIL_FROM not configured".to_string()))?,
                from_name,
            },
            _ => {
                return Err(AuthError::ConfigurationError(format!(
                    "Unknown email provider: {}",
                    email_provider
                )))
            }
        };

        Ok(Self { provider })
    }

    pub fn host(&self) -> &str {
        match &self.provider {
            EmailProvider::Smtp { host, .. } | EmailProvider::MailHog { host, .. } => host,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.provider {
            EmailProvider::Smtp { username, .. } => username.as_deref(),
            EmailProvider::MailHog { .. } => None,
        }
    }

    pub fn from_email(&self) -> &str {
        match &self.provider {
            EmailProvider::Smtp { from_email, .. } | EmailProvider::MailHog { from_email, .. } => {
                from_email
            }
        }
    }

    pub async fn send(&self, email: EmailMessage) -> Result<()> {
        match &self.provider {
            EmailProvider::Smtp {
                host,
                port,
                username,
                password,
                from_email,
                from_name,
            } => {
                let credentials = match (username, password) {
                    (Some(user), Some(pass)) => Some(Credentials::new(user.clone(), pass.clone())),
                    _ => None,
                };
                self.send_smtp(host, *port, credentials, from_email, from_name, email)
                    .await
            }
            EmailProvider::MailHog {
                host,
                port,
                from_email,
                from_name,
            } => {
                // MailHog doesn't require authentication
                self.send_smtp(host, *port, None, from_email, from_name, email)
                    .await
            }
        }
    }

    async fn send_smtp(
        &self,
        host: &str,
        port: u16,
        credentials: Option<Credentials>,
        from_email: &str,
        from_name: &str,
        email: EmailMessage,
    ) -> Result<()> {
        let message = build_message(from_email, from_name, &email)?;

        // Plain transport for local catchers (1025/1027), TLS relay otherwise
        let mailer = if port == 1025 || port == 1027 {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            builder.build()
        } else {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| AuthError::ExternalProviderError(format!("Failed to create SMTP transport: {}", e)))?
                .port(port);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            builder.build()
        };

        mailer
            .send(message)
            .await
            .map_err(|e| AuthError::ExternalProviderError(format!("Failed to send email: {}", e)))?;

        tracing::info!(
            "Email sent successfully to {} with subject: {}",
            email.to,
            email.subject
        );

        Ok(())
    }
}

fn build_message(from_email: &str, from_name: &str, email: &EmailMessage) -> Result<Message> {
    let from = format!("{} <{}>", from_name, from_email)
        .parse::<Mailbox>()
        .map_err(|e| AuthError::ConfigurationError(format!("Invalid from address: {}", e)))?;

    let to = if let Some(name) = &email.to_name {
        format!("{} <{}>", name, email.to)
    } else {
        email.to.clone()
    }
    .parse::<Mailbox>()
    .map_err(|e| AuthError::BadRequest(format!("Invalid to address: {}", e)))?;

    let message_builder = Message::builder().from(from).to(to).subject(&email.subject);

    let message = if let Some(html) = &email.html_body {
        message_builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text_body.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        )
    } else {
        message_builder.body(email.text_body.clone())
    };

    message.map_err(|e| AuthError::Internal(format!("Failed to build email: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailhog() -> EmailService {
        EmailService::new(EmailProvider::MailHog {
            host: "localhost".to_string(),
            port: 1025,
            from_email: "noreply@sso.local".to_string(),
            from_name: "SSO".to_string(),
        })
    }

    #[test]
    fn test_provider_info() {
        let service = mailhog();
        assert_eq!(service.host(), "localhost");
        assert_eq!(service.username(), None);
        assert_eq!(service.from_email(), "noreply@sso.local");
    }

    #[test]
    fn test_build_multipart_message() {
        let email = EmailMessage {
            to: "jane@example.com".to_string(),
            to_name: Some("Jane".to_string()),
            subject: "Welcome".to_string(),
            text_body: "Hello".to_string(),
            html_body: Some("<p>Hello</p>".to_string()),
        };

        assert!(build_message("noreply@sso.local", "SSO", &email).is_ok());
    }

    #[test]
    fn test_invalid_recipient() {
        let email = EmailMessage {
            to: "not an address".to_string(),
            to_name: None,
            subject: "Welcome".to_string(),
            text_body: "Hello".to_string(),
            html_body: None,
        };

        assert!(matches!(
            build_message("noreply@sso.local", "SSO", &email),
            Err(AuthError::BadRequest(_))
        ));
    }
}
