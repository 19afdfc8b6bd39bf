//! Authentication service: password login and JWT issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Permission, UserClaims, UserInfo},
    repository::Repository,
};

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate with username and password, returning a bearer token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, UserInfo)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .filter(|user| verify_password(password, &user.password_hash))
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        let info = UserInfo::from(&user);
        let now = Utc::now();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            permissions: info.permissions.clone(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))?;

        tracing::info!("User {} logged in", user.id);
        Ok((token, info))
    }

    /// Current state of the authenticated user
    pub async fn me(&self, claims: &UserClaims) -> AppResult<UserInfo> {
        self.repository
            .users
            .get_by_id(claims.user_id)
            .await?
            .map(|user| UserInfo::from(&user))
            .ok_or_else(|| AppError::Authentication("User no longer exists".to_string()))
    }

    /// Create the first administrator when the users table is empty
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let Some(password) = self.config.bootstrap_admin_password.as_deref() else {
            return Ok(());
        };
        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let permissions: Vec<String> = Permission::ALL.iter().map(|p| p.as_str().to_string()).collect();
        let user = self
            .repository
            .users
            .create("admin", &hash_password(password)?, &permissions)
            .await?;
        tracing::info!("Created bootstrap administrator (id {})", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
