//! Genre and language labels

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book genre (e.g. Science Fiction, French Poetry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Natural language a book is written in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

/// Create genre or language request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLabel {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
}

impl CreateLabel {
    /// Strips surrounding whitespace so blank names fail validation
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_label_is_rejected_after_trim() {
        let input = CreateLabel {
            name: "   ".to_string(),
        }
        .trimmed();
        assert_eq!(input.name, "");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_label_is_trimmed() {
        let input = CreateLabel {
            name: "  Science Fiction ".to_string(),
        }
        .trimmed();
        assert_eq!(input.name, "Science Fiction");
        assert!(input.validate().is_ok());
    }
}
