use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Longest lifetime a token may be issued with (ten years)
pub const MAX_TTL_SECONDS: i64 = 315_360_000;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,        // User ID
    pub email: String,
    pub name: String,
    pub roles: Vec<String>, // Global role names
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Interactive user session
    Access,
    /// Machine account session with caller-chosen lifetime
    Device,
}

/// Everything a token says about its subject
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub roles: Vec<String>,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_seconds: i64,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, DEFAULT_TTL_SECONDS)
    }

    pub fn with_ttl(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            ttl_seconds,
        }
    }

    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigurationError("JWT_SECRET must be set".to_string()))?;

        let ttl_seconds = std::env::var("JWT_TTL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECONDS);

        if !(1..=MAX_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(AuthError::ConfigurationError(format!(
                "JWT_TTL must be between 1 and {} seconds",
                MAX_TTL_SECONDS
            )));
        }

        Ok(Self::with_ttl(&secret, ttl_seconds))
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token. `ttl_seconds` overrides the configured lifetime.
    pub fn generate_token(
        &self,
        subject: TokenSubject<'_>,
        token_type: TokenType,
        ttl_seconds: Option<i64>,
    ) -> Result<String> {
        let now = Utc::now();
        let ttl = ttl_seconds.unwrap_or(self.ttl_seconds);
        if ttl > MAX_TTL_SECONDS {
            return Err(AuthError::BadRequest(format!(
                "Token lifetime cannot exceed {} seconds",
                MAX_TTL_SECONDS
            )));
        }

        let exp = Duration::try_seconds(ttl)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::BadRequest(format!("Invalid token lifetime: {}", ttl)))?;

        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.to_string(),
            name: subject.name.to_string(),
            roles: subject.roles,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}
