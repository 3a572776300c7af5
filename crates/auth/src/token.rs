use crate::error::{AuthError, Result};
use crate::jwt::{Claims, JwtService, TokenSubject, TokenType};
use sso_database::{Database, RoleHolder, RoleMappingRepository, UserRepository};
use sso_models::User;

/// Issues session tokens carrying the subject's current global roles
#[derive(Clone)]
pub struct TokenService {
    pub jwt: JwtService,
    role_mappings: RoleMappingRepository,
    users: UserRepository,
}

impl TokenService {
    pub fn new(db: &Database, jwt: JwtService) -> Self {
        Self {
            jwt,
            role_mappings: RoleMappingRepository::new(db.pool().clone()),
            users: UserRepository::new(db.pool().clone()),
        }
    }

    pub async fn issue(&self, user: &User, token_type: TokenType, ttl: Option<i64>) -> Result<String> {
        let roles = self.role_mappings.roles(RoleHolder::User(user.id)).await?;
        let name = user.display_name();

        let token = self.jwt.generate_token(
            TokenSubject {
                user_id: user.id,
                email: &user.email,
                name: &name,
                roles,
            },
            token_type,
            ttl,
        )?;

        tracing::debug!("Issued {:?} token for user_id={}", token_type, user.id);

        Ok(token)
    }

    /// Re-issue a token for the holder of `claims`, reloading roles
    pub async fn refresh(&self, claims: &Claims) -> Result<String> {
        let user = self.users.find_by_id(claims.user_id()?).await?;
        if user.blocked {
            return Err(AuthError::AccountBlocked);
        }
        self.issue(&user, claims.token_type, None).await
    }

    pub fn validate(&self, token: &str) -> Result<Claims> {
        self.jwt.validate_token(token)
    }
}
