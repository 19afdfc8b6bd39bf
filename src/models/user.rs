//! User model, permissions and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Named capabilities granted to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Set book as returned; also grants renewals and the all-loans view
    CanMarkReturned,
    /// View all borrowed books
    CanViewAllLoans,
    /// Create, edit and delete books, genres and languages
    CanEditBook,
    /// Create, update and delete authors
    CanManageAuthors,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::CanMarkReturned,
        Permission::CanViewAllLoans,
        Permission::CanEditBook,
        Permission::CanManageAuthors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::CanViewAllLoans => "can_view_all_loans",
            Permission::CanEditBook => "can_edit_book",
            Permission::CanManageAuthors => "can_manage_authors",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

/// User row from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub permissions: Vec<String>,
}

impl User {
    /// Granted permissions; unknown names stored in the database are skipped.
    pub fn permissions(&self) -> Vec<Permission> {
        self.permissions
            .iter()
            .filter_map(|name| match name.parse() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("User {}: {}", self.id, e);
                    None
                }
            })
            .collect()
    }
}

/// Public view of the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub permissions: Vec<Permission>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            permissions: user.permissions(),
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        self.require_any(&[permission])
    }

    /// Succeeds when at least one of `permissions` is granted
    pub fn require_any(&self, permissions: &[Permission]) -> Result<(), AppError> {
        if permissions.iter().any(|p| self.has_permission(*p)) {
            Ok(())
        } else {
            let names: Vec<&str> = permissions.iter().map(|p| p.as_str()).collect();
            Err(AppError::Authorization(format!(
                "Requires permission {}",
                names.join(" or ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 3,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_permission_names() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>(), Ok(p));
        }
        assert!("can_fly".parse::<Permission>().is_err());
    }

    #[test]
    fn test_require_any() {
        let c = claims(vec![Permission::CanViewAllLoans]);
        assert!(c
            .require_any(&[Permission::CanMarkReturned, Permission::CanViewAllLoans])
            .is_ok());
        assert!(matches!(
            c.require_permission(Permission::CanMarkReturned),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_token_round_trip_and_wrong_secret() {
        let c = claims(vec![Permission::CanEditBook]);
        let token = c.create_token("secret").unwrap();

        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 3);
        assert!(decoded.has_permission(Permission::CanEditBook));

        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_unknown_stored_permissions_are_skipped() {
        let user = User {
            id: 1,
            username: "u".to_string(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            permissions: vec!["can_edit_book".to_string(), "legacy".to_string()],
        };
        assert_eq!(user.permissions(), vec![Permission::CanEditBook]);
    }
}
