//! Book (catalog record, not a physical copy) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{
    author::Author,
    book_instance::BookInstance,
    genre::{Genre, Language},
    Pagination,
};

/// Number of genres shown in list views
pub const DISPLAY_GENRE_LIMIT: usize = 3;

/// Default page size of the book list
pub const BOOKS_PER_PAGE: i64 = 10;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, if any
    pub author: Option<String>,
    /// First genres joined by ", "
    pub genres: String,
}

/// Book with its relations resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub language: Option<Language>,
    pub instances: Vec<BookInstance>,
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

/// Joins the names of the first genres, the way list pages summarize a book
pub fn display_genre<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .take(DISPLAY_GENRE_LIMIT)
        .collect::<Vec<_>>()
        .join(", ")
}
