//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod user;

use serde::Deserialize;
use utoipa::IntoParams;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails, BookShort};
pub use book_instance::{BookInstance, LoanStatus};
pub use genre::{Genre, Language};
pub use user::{Permission, User, UserClaims};

/// Highest page number honoured; larger requests get an empty page
pub const MAX_PAGE: i64 = 1_000_000;

/// Page selection shared by every list endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
    /// Items per page (default depends on the list)
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn per_page(&self, default: i64) -> i64 {
        self.per_page.unwrap_or(default).clamp(1, 100)
    }

    pub fn offset(&self, default: i64) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(10), 10);
        assert_eq!(p.offset(10), 0);
    }

    #[test]
    fn test_pagination_offset_and_clamping() {
        assert_eq!(Pagination::new(3, 10).offset(20), 20);
        assert_eq!(Pagination::new(0, 10).page(), 1);
        assert_eq!(Pagination::new(1, 1000).per_page(10), 100);
        assert_eq!(Pagination::new(1, -5).per_page(10), 1);
    }

    #[test]
    fn test_pagination_huge_page_does_not_overflow() {
        let p = Pagination::new(i64::MAX, 100);
        assert_eq!(p.page(), MAX_PAGE);
        assert_eq!(p.offset(10), (MAX_PAGE - 1) * 100);
        assert!(p.offset(10) > 0);
    }
}
