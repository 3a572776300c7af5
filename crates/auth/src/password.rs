use crate::error::{AuthError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use sso_models::PasswordPolicy;

const SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash a password using Argon2id
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against an Argon2 or legacy bcrypt hash
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        if Self::is_bcrypt(hash) {
            return Ok(bcrypt::verify(password, hash)?);
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))?;

        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHashError(e.to_string())),
        }
    }

    /// Check if a hash should be replaced by a fresh Argon2id hash
    pub fn needs_rehash(hash: &str) -> bool {
        if Self::is_bcrypt(hash) {
            return true;
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return true,
        };

        parsed_hash.algorithm != argon2::Algorithm::Argon2id.ident()
    }

    fn is_bcrypt(hash: &str) -> bool {
        hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$")
    }
}

/// Check a candidate password against the configured policy
pub fn validate_password(policy: &PasswordPolicy, password: &str) -> Result<()> {
    let length = password.chars().count();

    if length > policy.max {
        return Err(AuthError::InvalidPasswordFormat(format!(
            "Password must be at most {} characters",
            policy.max
        )));
    }

    if length < policy.min {
        return Err(AuthError::InvalidPasswordFormat(format!(
            "Password must be at least {} characters",
            policy.min
        )));
    }

    if policy.upper_letter {
        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one lowercase letter".to_string(),
            ));
        }
    }

    if policy.symbol && !password.chars().any(|c| SYMBOLS.contains(c)) {
        return Err(AuthError::InvalidPasswordFormat(format!(
            "Password must contain at least one of {}",
            SYMBOLS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "MySecureP@ssw0rd";
        let hash = PasswordHasher::hash(password).expect("Failed to hash password");

        assert!(PasswordHasher::verify(password, &hash).unwrap());
        assert!(!PasswordHasher::verify("WrongPassword1!", &hash).unwrap());
        assert!(!PasswordHasher::needs_rehash(&hash));
    }

    #[test]
    fn test_legacy_bcrypt_hash() {
        let hash = bcrypt::hash("Legacy123", 4).unwrap();

        assert!(PasswordHasher::verify("Legacy123", &hash).unwrap());
        assert!(!PasswordHasher::verify("legacy123", &hash).unwrap());
        assert!(PasswordHasher::needs_rehash(&hash));
    }

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();

        // Too short
        assert!(validate_password(&policy, "Short1").is_err());

        // Too long
        assert!(validate_password(&policy, "ThisPasswordIsWayTooLong").is_err());

        // No uppercase
        assert!(validate_password(&policy, "nouppercase").is_err());

        // No lowercase
        assert!(validate_password(&policy, "NOLOWERCASE").is_err());

        // Symbols not required by default
        assert!(validate_password(&policy, "ValidPass").is_ok());
    }

    #[test]
    fn test_symbol_policy() {
        let policy = PasswordPolicy {
            symbol: true,
            upper_letter: false,
            ..PasswordPolicy::default()
        };

        assert!(validate_password(&policy, "plainpass").is_err());
        assert!(validate_password(&policy, "plain{pass").is_ok());

        let err = validate_password(&policy, "plainpass").unwrap_err();
        assert_eq!(err.code(), Some(11));
    }

    #[test]
    fn test_length_counts_characters() {
        let policy = PasswordPolicy {
            upper_letter: false,
            ..PasswordPolicy::default()
        };

        // 8 characters, more than 8 bytes
        assert!(validate_password(&policy, "éééééééé").is_ok());
    }
}
