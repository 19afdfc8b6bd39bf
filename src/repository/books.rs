//! Books repository for database operations

use std::collections::HashMap;

use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{display_genre, Book, BookInput, BookQuery, BookShort, BOOKS_PER_PAGE},
        genre::{Genre, Language},
    },
};

/// `ILIKE` pattern matching `text` anywhere, with `%`, `_` and `\` taken literally
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn, language_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books by title with pagination, ordered by title
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookShort>, i64)> {
        let pagination = query.pagination();
        let pattern = query
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| contains_pattern(t.trim()));

        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author_id, a.first_name, a.last_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            WHERE ($1::TEXT IS NULL OR b.title ILIKE $1)
            ORDER BY b.title, b.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(pagination.per_page(BOOKS_PER_PAGE))
        .bind(pagination.offset(BOOKS_PER_PAGE))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1::TEXT IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.get("id")).collect();
        let mut genres_by_book = self.genre_names_for(&ids).await?;

        let books = rows
            .iter()
            .map(|r| {
                let id: i32 = r.get("id");
                let first_name: Option<String> = r.get("first_name");
                let last_name: Option<String> = r.get("last_name");
                let genre_names = genres_by_book.remove(&id).unwrap_or_default();
                BookShort {
                    id,
                    title: r.get("title"),
                    author_id: r.get("author_id"),
                    author: last_name.map(|last| format!("{}, {}", last, first_name.unwrap_or_default())),
                    genres: display_genre(genre_names.iter().map(String::as_str)),
                }
            })
            .collect();

        Ok((books, total))
    }

    /// Genre names per book, in genre id order
    async fn genre_names_for(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<String>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT bg.book_id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = ANY($1)
            ORDER BY bg.book_id, g.id
            "#,
        )
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.get("book_id")).or_default().push(row.get("name"));
        }
        Ok(map)
    }

    /// Genres of a book
    pub async fn get_genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    pub async fn get_language(&self, language_id: i32) -> AppResult<Option<Language>> {
        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(language_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(language)
    }

    /// Create a book and its genre links in one transaction
    pub async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author_id, summary, isbn, language_id
            "#,
        )
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.summary)
        .bind(&input.isbn)
        .bind(input.language_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_genres(&mut tx, book.id, &input.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    /// Replace every field of a book, genres included
    pub async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4, language_id = $5
            WHERE id = $6
            RETURNING id, title, author_id, summary, isbn, language_id
            "#,
        )
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.summary)
        .bind(&input.isbn)
        .bind(input.language_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Self::replace_genres(&mut tx, id, &input.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    async fn replace_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                SELECT $1, UNNEST($2::INTEGER[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(book_id)
            .bind(genre_ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Delete a book. Its copies remain with `book_id = NULL`.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Books whose title contains `word`, ignoring case
    pub async fn count_title_containing(&self, word: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE title ILIKE $1")
            .bind(contains_pattern(word))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
