//! Statistics service

use crate::{
    api::stats::{CatalogCounts, StatsResponse},
    error::AppResult,
    models::book_instance::LoanStatus,
    repository::Repository,
};

/// Word counted in book titles on the home page
const TITLE_WORD: &str = "the";

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Home page counters
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let repo = &self.repository;

        let counts = CatalogCounts {
            books: repo.books.count().await?,
            instances: repo.instances.count().await?,
            instances_available: repo.instances.count_by_status(LoanStatus::Available).await?,
            instances_on_loan: repo.instances.count_by_status(LoanStatus::OnLoan).await?,
            authors: repo.authors.count().await?,
            genres: repo.genres.count_genres().await?,
        };
        let books_with_word = repo.books.count_title_containing(TITLE_WORD).await?;

        Ok(StatsResponse {
            counts,
            title_word: TITLE_WORD.to_string(),
            books_with_word,
        })
    }
}
