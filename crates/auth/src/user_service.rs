use crate::email::EmailTemplateService;
use crate::error::{AuthError, Result};
use crate::extra_fields::{apply_editable_fields, merge_extra_fields};
use crate::factor::AuthFactorSender;
use crate::otp;
use crate::password::{validate_password, PasswordHasher};
use crate::role_service::RoleService;
use crate::settings::{action_url, AccountSettings};
use chrono::{Duration, Utc};
use sso_database::{
    CredentialsRepository, Database, DatabaseError, ExtraFieldRepository, NewCredentials,
    OrgUserLinkRepository, RoleHolder, RoleMappingRepository, UserRepository,
};
use sso_models::email_template::{CONFIRM_ACCOUNT_TEMPLATE, INVITE_USER_TEMPLATE};
use sso_models::user::{RegisterRequest, DEFAULT_USER_TYPE};
use sso_models::{
    Factor, NewUser, UpdateProfile, UpdateUser, User, UserCredentials, UserProfile, UserWithRoles,
    ADMIN_ROLE,
};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

const RESET_CODE_TTL_MINUTES: i64 = 15;

/// Post-password checks on an account trying to sign in, in the order they are reported
pub fn check_account_state(user: &User, credentials: &UserCredentials, now: i64) -> Result<()> {
    if !credentials.is_activated() {
        return Err(AuthError::EmailNotValidated);
    }

    if user.is_expired(now) {
        return Err(AuthError::AccountExpired);
    }

    if user.blocked {
        return Err(AuthError::AccountBlocked);
    }

    if credentials.is_password_expired(now) {
        return Err(AuthError::PasswordExpired);
    }

    Ok(())
}

/// A reset code is accepted only against an existing, unexpired, matching credentials row
pub fn check_reset_code(
    credentials: Option<&UserCredentials>,
    code: &str,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let credentials = credentials.ok_or(AuthError::InvalidPassword)?;

    let expired = credentials
        .password_reset_expires_at
        .map_or(false, |expires_at| expires_at <= now);

    if expired || !otp::matches(code, credentials.password_reset_code.as_deref()) {
        return Err(AuthError::InvalidPassword);
    }

    Ok(())
}

/// Turn a unique-email violation into the account error clients expect
fn email_conflict(err: DatabaseError) -> AuthError {
    match err {
        DatabaseError::DuplicateEntry(_) => AuthError::EmailAlreadyPresent,
        other => AuthError::DatabaseError(other),
    }
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    credentials: CredentialsRepository,
    role_mappings: RoleMappingRepository,
    roles: RoleService,
    links: OrgUserLinkRepository,
    extra_fields: ExtraFieldRepository,
    templates: EmailTemplateService,
    factors: AuthFactorSender,
    settings: AccountSettings,
}

impl UserService {
    pub fn new(
        db: &Database,
        roles: RoleService,
        templates: EmailTemplateService,
        factors: AuthFactorSender,
        settings: AccountSettings,
    ) -> Self {
        Self {
            users: UserRepository::new(db.pool().clone()),
            credentials: CredentialsRepository::new(db.pool().clone()),
            role_mappings: RoleMappingRepository::new(db.pool().clone()),
            roles,
            links: OrgUserLinkRepository::new(db.pool().clone()),
            extra_fields: ExtraFieldRepository::new(db.pool().clone()),
            templates,
            factors,
            settings,
        }
    }

    pub fn settings(&self) -> &AccountSettings {
        &self.settings
    }

    /// Self-registration
    pub async fn create_user(&self, request: RegisterRequest) -> Result<User> {
        if !self.settings.sso.public_creation {
            return Err(AuthError::Forbidden("Public account creation is disabled".to_string()));
        }

        request.validate()?;
        validate_password(&self.settings.password, &request.password)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyPresent);
        }

        let definitions = self.extra_fields.list().await?;
        let extra_fields = merge_extra_fields(&definitions, &request.extra_fields, true)?;

        let code = self.settings.sso.account_validation.then(otp::generate);
        let credentials = NewCredentials {
            password_hash: Some(PasswordHasher::hash(&request.password)?),
            activation_code: code.as_deref().map(otp::hash),
        };

        let new_user = NewUser {
            user_type: DEFAULT_USER_TYPE.to_string(),
            email: request.email,
            phone: request.phone,
            first_name: request.first_name,
            last_name: request.last_name,
            thumbnail: request.thumbnail,
            extra_fields,
        };

        let user = self
            .users
            .create_with_credentials(&new_user, &credentials, &self.settings.sso.default_roles)
            .await
            .map_err(email_conflict)?;

        tracing::info!("User created: id={}, email={}", user.id, user.email);

        if let Some(code) = code {
            let url = action_url(&self.settings.redirect_url, &code, &user.email, "confirm");
            if let Err(e) = self
                .templates
                .send_template(
                    &user.email,
                    CONFIRM_ACCOUNT_TEMPLATE,
                    &serde_json::json!({ "url": url }),
                    &serde_json::Value::Null,
                )
                .await
            {
                tracing::error!("Failed to send confirmation email to {}: {}", user.email, e);
            }
        }

        Ok(user)
    }

    /// Create an active account holding the ADMIN role
    pub async fn create_admin(&self, email: &str, password: &str) -> Result<User> {
        validate_password(&self.settings.password, password)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyPresent);
        }

        let definitions = self.extra_fields.list().await?;
        let mut new_user = NewUser::invited(email);
        new_user.extra_fields = merge_extra_fields(&definitions, &Default::default(), false)?;

        let credentials = NewCredentials {
            password_hash: Some(PasswordHasher::hash(password)?),
            activation_code: None,
        };

        let user = self
            .users
            .create_with_credentials(&new_user, &credentials, &[ADMIN_ROLE.to_string()])
            .await
            .map_err(email_conflict)?;

        tracing::info!("Admin created: id={}, email={}", user.id, user.email);
        Ok(user)
    }

    /// Create a passwordless account and email it an activation link
    pub async fn invite(&self, email: &str) -> Result<User> {
        let definitions = self.extra_fields.list().await?;
        let mut new_user = NewUser::invited(email);
        new_user.extra_fields = merge_extra_fields(&definitions, &Default::default(), false)?;

        let code = otp::generate();
        let credentials = NewCredentials {
            password_hash: None,
            activation_code: Some(otp::hash(&code)),
        };

        let user = self
            .users
            .create_with_credentials(&new_user, &credentials, &self.settings.sso.default_roles)
            .await
            .map_err(email_conflict)?;

        tracing::info!("User invited: id={}, email={}", user.id, user.email);

        let url = action_url(&self.settings.redirect_url, &code, &user.email, "validate");
        self.templates
            .send_template(
                &user.email,
                INVITE_USER_TEMPLATE,
                &serde_json::json!({ "url": url }),
                &serde_json::Value::Null,
            )
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    async fn user_and_credentials(&self, email: &str) -> Result<(User, UserCredentials)> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidEmail)?;

        let credentials = self
            .credentials
            .find_by_user(user.id)
            .await?
            .ok_or(AuthError::NoCredentials)?;

        Ok((user, credentials))
    }

    /// Check an email/password pair and the account state
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let (user, credentials) = self.user_and_credentials(email).await?;

        let hash = credentials
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidPassword)?;

        if !PasswordHasher::verify(password, hash)? {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(AuthError::InvalidPassword);
        }

        check_account_state(&user, &credentials, Utc::now().timestamp())?;

        if PasswordHasher::needs_rehash(hash) {
            match PasswordHasher::hash(password) {
                Ok(new_hash) => {
                    if let Err(e) = self.credentials.update_password(user.id, &new_hash).await {
                        tracing::warn!("Failed to upgrade password hash for user_id={}: {}", user.id, e);
                    } else {
                        tracing::info!("Password hash upgraded for user_id={}", user.id);
                    }
                }
                Err(e) => tracing::warn!("Failed to rehash password: {}", e),
            }
        }

        Ok(user)
    }

    /// Consume an activation code. `password` sets the first password of an invited account.
    pub async fn activate(&self, email: &str, code: &str, password: Option<&str>) -> Result<User> {
        let (user, credentials) = self.user_and_credentials(email).await?;

        if credentials.is_activated() {
            return Err(AuthError::AlreadyValidated);
        }

        if !otp::matches(code, credentials.activation_code.as_deref()) {
            return Err(AuthError::InvalidPassword);
        }

        let password_hash = match password {
            Some(password) => {
                validate_password(&self.settings.password, password)?;
                Some(PasswordHasher::hash(password)?)
            }
            None => None,
        };

        self.credentials
            .activate(user.id, password_hash.as_deref())
            .await?;

        tracing::info!("Account activated: id={}, email={}", user.id, user.email);
        Ok(user)
    }

    pub async fn validate_activation_code(&self, email: &str, code: &str) -> Result<()> {
        self.activate(email, code, None).await?;
        Ok(())
    }

    /// Send a password reset code through the chosen factor
    pub async fn request_password_reset(&self, email: &str, factor: Factor) -> Result<()> {
        let (user, _) = self.user_and_credentials(email).await?;

        let code = otp::generate();
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);
        self.credentials
            .set_reset_code(user.id, &otp::hash(&code), expires_at)
            .await?;

        self.factors.send(factor, &user.email, &code).await?;

        tracing::info!("Password reset requested: user_id={}, factor={}", user.id, factor);
        Ok(())
    }

    pub async fn confirm_password_reset(&self, email: &str, code: &str, password: &str) -> Result<()> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidEmail)?;

        let credentials = self.credentials.find_by_user(user.id).await?;
        check_reset_code(credentials.as_ref(), code, Utc::now())?;

        validate_password(&self.settings.password, password)?;
        let password_hash = PasswordHasher::hash(password)?;

        if !self
            .credentials
            .complete_reset(user.id, &otp::hash(code), &password_hash)
            .await?
        {
            return Err(AuthError::InvalidPassword);
        }

        tracing::info!("Password reset completed: user_id={}", user.id);
        Ok(())
    }

    pub async fn update_password(&self, user_id: Uuid, old: &str, new: &str) -> Result<()> {
        let credentials = self
            .credentials
            .find_by_user(user_id)
            .await?
            .ok_or(AuthError::NoCredentials)?;

        let current = credentials
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidPassword)?;

        if !PasswordHasher::verify(old, current)? {
            return Err(AuthError::InvalidPassword);
        }

        validate_password(&self.settings.password, new)?;
        self.credentials
            .update_password(user_id, &PasswordHasher::hash(new)?)
            .await?;

        tracing::info!("Password changed: user_id={}", user_id);
        Ok(())
    }

    /// Register a phone number and text it a confirmation code
    pub async fn set_phone_factor(&self, user_id: Uuid, phone: &str) -> Result<()> {
        let code = otp::generate();
        self.users.set_phone(user_id, phone, &otp::hash(&code)).await?;
        self.factors.send_sms(phone, &code).await?;

        tracing::info!("Phone factor registered: user_id={}", user_id);
        Ok(())
    }

    pub async fn confirm_phone_factor(&self, user_id: Uuid, code: &str) -> Result<()> {
        let user = self.users.find_by_id(user_id).await?;

        if user.phone_activation_code.is_none() {
            return Err(AuthError::AlreadyValidated);
        }

        if !otp::matches(code, user.phone_activation_code.as_deref()) {
            return Err(AuthError::InvalidPassword);
        }

        self.users.confirm_phone(user_id).await?;
        Ok(())
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = self.users.find_by_id(user_id).await?;
        let roles = self.role_mappings.roles(RoleHolder::User(user_id)).await?;
        let organisations = self
            .links
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|link| link.organisation_id)
            .collect();

        Ok(UserProfile {
            id: user.id,
            name: user.display_name(),
            email: user.email,
            firstname: user.first_name,
            lastname: user.last_name,
            telephone: user.phone,
            thumbnail: user.thumbnail,
            extra_fields: user.extra_fields,
            roles,
            organisations,
        })
    }

    pub async fn update_profile(&self, user_id: Uuid, update: UpdateProfile) -> Result<UserProfile> {
        update.validate()?;

        let user = self.users.find_by_id(user_id).await?;
        let extra_fields = match &update.extra_fields {
            Some(provided) => {
                let definitions = self.extra_fields.list().await?;
                apply_editable_fields(&definitions, &user.extra_fields, provided)?
            }
            None => user.extra_fields.clone(),
        };

        self.users
            .update_profile(user_id, &update, &extra_fields)
            .await?;

        self.profile(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        if !self.users.delete(user_id).await? {
            return Err(DatabaseError::not_found("User", &user_id.to_string()).into());
        }

        tracing::info!("User deleted: id={}", user_id);
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.users.count().await?)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserWithRoles>> {
        let users = self.users.list(limit, offset).await?;
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let mut roles: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (user_id, role) in self.role_mappings.roles_for_users(&ids).await? {
            roles.entry(user_id).or_default().push(role);
        }

        let credentials: HashMap<Uuid, UserCredentials> = self
            .credentials
            .find_for_users(&ids)
            .await?
            .into_iter()
            .map(|c| (c.user_id, c))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let credentials = credentials.get(&user.id);
                UserWithRoles {
                    roles: roles.remove(&user.id).unwrap_or_default(),
                    activated: credentials.map_or(false, |c| c.is_activated()),
                    has_password: credentials.map_or(false, |c| c.password_hash.is_some()),
                    user,
                }
            })
            .collect())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserWithRoles> {
        let user = self.users.find_by_id(user_id).await?;
        let roles = self.role_mappings.roles(RoleHolder::User(user_id)).await?;
        let credentials = self.credentials.find_by_user(user_id).await?;

        Ok(UserWithRoles {
            user,
            roles,
            activated: credentials.as_ref().map_or(false, |c| c.is_activated()),
            has_password: credentials.as_ref().map_or(false, |c| c.password_hash.is_some()),
        })
    }

    /// Admin update. Profile fields are written first; when `roles` is present
    /// the global role set is then diffed and replaced.
    pub async fn update(&self, user_id: Uuid, update: UpdateUser) -> Result<UserWithRoles> {
        update.validate()?;

        self.users
            .update(user_id, &update)
            .await
            .map_err(email_conflict)?;

        if let Some(desired) = &update.roles {
            self.roles.set_roles(RoleHolder::User(user_id), desired).await?;
        }

        self.get(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            user_type: DEFAULT_USER_TYPE.to_string(),
            email: "jane@example.com".to_string(),
            phone: None,
            phone_activation_code: None,
            first_name: None,
            last_name: None,
            thumbnail: None,
            blocked: false,
            valid_until: None,
            extra_fields: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn credentials(user: &User) -> UserCredentials {
        UserCredentials {
            id: Uuid::new_v4(),
            user_id: user.id,
            password_hash: Some("hash".to_string()),
            activation_code: None,
            password_reset_code: None,
            password_reset_expires_at: None,
            valid_until: None,
        }
    }

    #[test]
    fn test_active_account_passes() {
        let user = user();
        assert!(check_account_state(&user, &credentials(&user), 1_000).is_ok());
    }

    #[test]
    fn test_pending_activation_reported_first() {
        let mut user = user();
        user.blocked = true;
        user.valid_until = Some(10);

        let mut creds = credentials(&user);
        creds.activation_code = Some(otp::hash("123456"));

        assert!(matches!(
            check_account_state(&user, &creds, 1_000),
            Err(AuthError::EmailNotValidated)
        ));
    }

    #[test]
    fn test_expired_before_blocked() {
        let mut user = user();
        user.blocked = true;
        user.valid_until = Some(500);
        let creds = credentials(&user);

        assert!(matches!(
            check_account_state(&user, &creds, 1_000),
            Err(AuthError::AccountExpired)
        ));

        user.valid_until = Some(0);
        assert!(matches!(
            check_account_state(&user, &creds, 1_000),
            Err(AuthError::AccountBlocked)
        ));
    }

    #[test]
    fn test_password_expiry() {
        let user = user();
        let mut creds = credentials(&user);
        creds.valid_until = Some(999);

        let err = check_account_state(&user, &creds, 1_000).unwrap_err();
        assert_eq!(err.code(), Some(7));
    }

    #[test]
    fn test_email_conflict_mapping() {
        assert!(matches!(
            email_conflict(DatabaseError::duplicate("User", "email")),
            AuthError::EmailAlreadyPresent
        ));
        assert!(matches!(
            email_conflict(DatabaseError::not_found("User", "x")),
            AuthError::DatabaseError(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_reset_code_checks() {
        let user = user();
        let now = Utc::now();
        let mut stored = credentials(&user);
        stored.password_reset_code = Some(otp::hash("123456"));
        stored.password_reset_expires_at = Some(now + Duration::minutes(5));

        assert!(check_reset_code(Some(&stored), "123456", now).is_ok());
        assert!(matches!(
            check_reset_code(Some(&stored), "654321", now),
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            check_reset_code(Some(&stored), "123456", now + Duration::minutes(5)),
            Err(AuthError::InvalidPassword)
        ));

        // A user without a credentials row gets the same answer as a wrong code
        let missing = check_reset_code(None, "123456", now).unwrap_err();
        assert!(matches!(missing, AuthError::InvalidPassword));
        assert_eq!(missing.code(), Some(1));
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_rejected_update_keeps_roles() {
        let db = Database::new(sso_database::DatabaseConfig::from_env()).await.unwrap();
        let service = crate::test_support::user_service(&db);
        let users = UserRepository::new(db.pool().clone());
        let mappings = RoleMappingRepository::new(db.pool().clone());

        let taken = format!("{}@example.com", Uuid::new_v4());
        let first = users
            .create_with_credentials(&NewUser::invited(&taken), &NewCredentials::default(), &[])
            .await
            .unwrap();
        let second = users
            .create_with_credentials(
                &NewUser::invited(&format!("{}@example.com", Uuid::new_v4())),
                &NewCredentials::default(),
                &["USER".to_string()],
            )
            .await
            .unwrap();

        let update = UpdateUser {
            email: Some(taken.clone()),
            roles: Some(vec![ADMIN_ROLE.to_string()]),
            ..Default::default()
        };
        let result = service.update(second.id, update).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyPresent)));

        let roles = mappings.roles(RoleHolder::User(second.id)).await.unwrap();
        assert_eq!(roles, vec!["USER".to_string()]);

        let ghost = Uuid::new_v4();
        let update = UpdateUser {
            roles: Some(vec![ADMIN_ROLE.to_string()]),
            ..Default::default()
        };
        let result = service.update(ghost, update).await;
        assert!(matches!(
            result,
            Err(AuthError::DatabaseError(DatabaseError::NotFound(_)))
        ));
        assert!(mappings.roles(RoleHolder::User(ghost)).await.unwrap().is_empty());

        users.delete(first.id).await.unwrap();
        users.delete(second.id).await.unwrap();
    }
}
