//! Catalog management service: books, authors, genres, languages and copies

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorInput, AUTHORS_PER_PAGE},
        book::{Book, BookDetails, BookInput, BookQuery, BookShort},
        book_instance::{BookInstance, CreateBookInstance, LoanStatus, UpdateBookInstance},
        genre::{Genre, Language},
        Pagination,
    },
    repository::{BookInstanceStore, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.search(query).await
    }

    /// Book with author, genres, language and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => self.repository.books.get_language(language_id).await?,
            None => None,
        };
        let genres = self.repository.books.get_genres(id).await?;
        let today = chrono::Utc::now().date_naive();
        let instances = self
            .repository
            .instances
            .list_for_book(id)
            .await?
            .into_iter()
            .map(|i| i.with_overdue_flag(today))
            .collect();

        Ok(BookDetails {
            book,
            author,
            genres,
            language,
            instances,
        })
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let book = self.repository.books.create(&input).await?;
        tracing::info!("Book {} created: {}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        self.repository.books.update(id, &input).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, pagination: Pagination) -> AppResult<(Vec<Author>, i64)> {
        self.repository
            .authors
            .list(
                pagination.per_page(AUTHORS_PER_PAGE),
                pagination.offset(AUTHORS_PER_PAGE),
            )
            .await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.get_books(id).await?;
        Ok(AuthorDetails {
            full_name: author.full_name(),
            author,
            books,
        })
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        self.repository.authors.create(&input).await
    }

    pub async fn update_author(&self, id: i32, input: AuthorInput) -> AppResult<Author> {
        self.repository.authors.update(id, &input).await
    }

    /// Delete an author; books keep existing without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Author {} deleted", id);
        Ok(())
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list_genres().await
    }

    pub async fn create_genre(&self, name: &str) -> AppResult<Genre> {
        self.repository.genres.create_genre(name).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.genres.list_languages().await
    }

    pub async fn create_language(&self, name: &str) -> AppResult<Language> {
        self.repository.genres.create_language(name).await
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        let instance = self.repository.instances.get(id).await?;
        Ok(instance.with_overdue_flag(chrono::Utc::now().date_naive()))
    }

    /// Add a copy of a book. New copies cannot start out on loan.
    pub async fn create_instance(&self, input: CreateBookInstance) -> AppResult<BookInstance> {
        if input.status == Some(LoanStatus::OnLoan) {
            return Err(AppError::Conflict(
                "A new copy cannot start on loan; borrow it instead".to_string(),
            ));
        }
        self.repository.books.get_by_id(input.book_id).await?;

        let instance = self.repository.instances.create(&input).await?;
        tracing::info!("Book instance {} created for book {}", instance.id, input.book_id);
        Ok(instance)
    }

    /// Administrative edit, guarded by the status transition table
    pub async fn update_instance(&self, id: Uuid, update: UpdateBookInstance) -> AppResult<BookInstance> {
        let mut instance = self.repository.instances.get(id).await?;
        let prior_status = instance.status;

        instance.apply_update(update)?;
        let saved = self
            .repository
            .instances
            .save_if_status(&instance, prior_status)
            .await?;

        if saved.status != prior_status {
            tracing::info!(
                "Book instance {} status changed from {} to {}",
                id,
                prior_status,
                saved.status
            );
        }
        Ok(saved.with_overdue_flag(chrono::Utc::now().date_naive()))
    }
}
