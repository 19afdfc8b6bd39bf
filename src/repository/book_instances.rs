//! Book instances repository.
//!
//! Status transitions that race with borrowers (borrow, return, administrative
//! edits) are conditional updates guarded by the expected prior status.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, CreateBookInstance, LoanStatus},
};

const SELECT_INSTANCE: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.borrower_id, bi.status,
           b.title AS book_title, u.username AS borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Persistence used by the loan workflow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// Fetch an instance whatever its status
    async fn get(&self, id: Uuid) -> AppResult<BookInstance>;

    /// Available -> OnLoan in one statement. `None` when no available copy matched.
    async fn mark_on_loan(
        &self,
        id: Uuid,
        borrower_id: i32,
        due_back: NaiveDate,
    ) -> AppResult<Option<BookInstance>>;

    /// OnLoan -> Available, clearing borrower and due date. `None` when no copy on loan matched.
    async fn mark_returned(&self, id: Uuid) -> AppResult<Option<BookInstance>>;

    /// Set the due date. `None` when the instance does not exist.
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<Option<BookInstance>>;

    /// Copies on loan ordered by due date, optionally restricted to one borrower
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookInstance>, i64)>;
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Re-read an instance with its joined display fields
    async fn fetch(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let instance = sqlx::query_as::<_, BookInstance>(&format!("{} WHERE bi.id = $1", SELECT_INSTANCE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(instance)
    }

    /// Instances of a book, ordered by due date
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let instances = sqlx::query_as::<_, BookInstance>(&format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.due_back NULLS LAST, bi.id",
            SELECT_INSTANCE
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(instances)
    }

    /// Create a new instance with a fresh UUID
    pub async fn create(&self, input: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO book_instances (id, book_id, imprint, status) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(input.book_id)
            .bind(&input.imprint)
            .bind(input.status.unwrap_or_default())
            .execute(&self.pool)
            .await?;

        self.get(id).await
    }

    /// Write an edited instance back, provided its status is still `expected_status`
    pub async fn save_if_status(
        &self,
        instance: &BookInstance,
        expected_status: LoanStatus,
    ) -> AppResult<BookInstance> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET book_id = $1, imprint = $2, due_back = $3, borrower_id = $4, status = $5
            WHERE id = $6 AND status = $7
            "#,
        )
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(instance.borrower_id)
        .bind(instance.status)
        .bind(instance.id)
        .bind(expected_status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Book instance {} changed concurrently, reload and retry",
                instance.id
            )));
        }

        self.get(instance.id).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn get(&self, id: Uuid) -> AppResult<BookInstance> {
        self.fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn mark_on_loan(
        &self,
        id: Uuid,
        borrower_id: i32,
        due_back: NaiveDate,
    ) -> AppResult<Option<BookInstance>> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = $2, due_back = $3
            WHERE id = $4 AND status = $5
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(due_back)
        .bind(id)
        .bind(LoanStatus::Available)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }

    async fn mark_returned(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = NULL, due_back = NULL
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(LoanStatus::Available)
        .bind(id)
        .bind(LoanStatus::OnLoan)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<Option<BookInstance>> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(id).await
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookInstance>, i64)> {
        // $2 IS NULL matches every borrower
        let instances = sqlx::query_as::<_, BookInstance>(&format!(
            r#"{}
            WHERE bi.status = $1 AND ($2::INTEGER IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
            SELECT_INSTANCE
        ))
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2::INTEGER IS NULL OR borrower_id = $2)",
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((instances, total))
    }
}
