use anyhow::Context;
use sso_auth::{AccountSettings, EmailService, JwtService, SmsService};
use sso_database::DatabaseConfig;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtService,
    pub email: EmailService,
    pub sms: SmsService,
    pub settings: AccountSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database: DatabaseConfig::from_env(),
            jwt: JwtService::from_env().context("JWT configuration")?,
            email: EmailService::from_env().context("email configuration")?,
            sms: SmsService::from_env().context("SMS configuration")?,
            settings: AccountSettings::from_env().context("account settings")?,
        })
    }
}
