//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Default page size of the author list
pub const AUTHORS_PER_PAGE: i64 = 10;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Catalog display form, "Last, First"
impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Book reference listed on an author's page
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorBook {
    pub id: i32,
    pub title: String,
    pub isbn: String,
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub full_name: String,
    pub books: Vec<AuthorBook>,
}

/// Create or replace author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan"))]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

fn validate_lifespan(input: &AuthorInput) -> Result<(), ValidationError> {
    match (input.date_of_birth, input.date_of_death) {
        (Some(born), Some(died)) if died < born => {
            let mut error = ValidationError::new("lifespan");
            error.message = Some("Date of death precedes date of birth".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 1,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1929, 10, 21),
            date_of_death: NaiveDate::from_ymd_opt(2018, 1, 22),
        }
    }

    #[test]
    fn test_display_names() {
        let a = author();
        assert_eq!(a.to_string(), "Le Guin, Ursula");
        assert_eq!(a.full_name(), "Ursula Le Guin");
    }

    #[test]
    fn test_input_rejects_death_before_birth() {
        let input = AuthorInput {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1),
            date_of_death: NaiveDate::from_ymd_opt(1999, 1, 1),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_rejects_empty_last_name() {
        let input = AuthorInput {
            first_name: "A".to_string(),
            last_name: String::new(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_accepts_unknown_dates() {
        let input = AuthorInput {
            first_name: "Homer".to_string(),
            last_name: "Unknown".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(input.validate().is_ok());
    }
}
