//! Loan workflow: borrowing, renewal, return and loan listings.
//!
//! Every operation takes the acting user's claims and checks the capability it
//! needs before touching storage.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, RenewalProposal},
        user::{Permission, UserClaims},
        Pagination,
    },
    repository::BookInstanceStore,
};

/// Loan period and renewal window
#[derive(Debug, Clone)]
pub struct LoanPolicy {
    pub loan_period: Duration,
    pub renewal_default: Duration,
    pub renewal_max: Duration,
    pub page_size: i64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::from(&LoansConfig::default())
    }
}

impl From<&LoansConfig> for LoanPolicy {
    fn from(config: &LoansConfig) -> Self {
        Self {
            loan_period: Duration::weeks(config.loan_weeks),
            renewal_default: Duration::weeks(config.renewal_default_weeks),
            renewal_max: Duration::weeks(config.renewal_max_weeks),
            page_size: config.page_size,
        }
    }
}

impl LoanPolicy {
    /// Due date given to a copy borrowed on `today`
    pub fn due_back_for_borrow(&self, today: NaiveDate) -> NaiveDate {
        today + self.loan_period
    }

    /// Date suggested when a librarian opens the renewal form
    pub fn default_renewal(&self, today: NaiveDate) -> NaiveDate {
        today + self.renewal_default
    }

    pub fn latest_renewal(&self, today: NaiveDate) -> NaiveDate {
        today + self.renewal_max
    }

    /// Accepts `proposed` when `today <= proposed <= today + renewal_max`
    pub fn validate_renewal_date(&self, proposed: NaiveDate, today: NaiveDate) -> AppResult<NaiveDate> {
        if proposed < today {
            return Err(AppError::Validation(
                "Invalid date - renewal in past".to_string(),
            ));
        }
        if proposed > self.latest_renewal(today) {
            return Err(AppError::Validation(format!(
                "Invalid date - renewal more than {} weeks ahead",
                self.renewal_max.num_weeks()
            )));
        }
        Ok(proposed)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn BookInstanceStore>,
    policy: LoanPolicy,
}

impl LoansService {
    pub fn new(store: Arc<dyn BookInstanceStore>, policy: LoanPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Borrow an available copy for the acting user
    pub async fn borrow_book(&self, id: Uuid, user: &UserClaims) -> AppResult<BookInstance> {
        self.borrow_book_on(id, user, today()).await
    }

    pub(crate) async fn borrow_book_on(
        &self,
        id: Uuid,
        user: &UserClaims,
        today: NaiveDate,
    ) -> AppResult<BookInstance> {
        let due_back = self.policy.due_back_for_borrow(today);

        let instance = self
            .store
            .mark_on_loan(id, user.user_id, due_back)
            .await?
            // A copy that exists but is not available looks the same as a missing one
            .ok_or_else(|| AppError::NotFound(format!("No available book instance {}", id)))?;

        tracing::info!(
            "Book instance {} borrowed by user {} until {}",
            id,
            user.user_id,
            due_back
        );
        Ok(instance.with_overdue_flag(today))
    }

    /// Initial state of the renewal form
    pub async fn renewal_proposal(&self, id: Uuid, user: &UserClaims) -> AppResult<RenewalProposal> {
        self.renewal_proposal_on(id, user, today()).await
    }

    pub(crate) async fn renewal_proposal_on(
        &self,
        id: Uuid,
        user: &UserClaims,
        today: NaiveDate,
    ) -> AppResult<RenewalProposal> {
        user.require_permission(Permission::CanMarkReturned)?;

        let instance = self.store.get(id).await?;
        Ok(RenewalProposal {
            instance: instance.with_overdue_flag(today),
            proposed_renewal_date: self.policy.default_renewal(today),
            max_renewal_date: self.policy.latest_renewal(today),
        })
    }

    /// Set a new due date on a copy (librarians only)
    pub async fn renew_book(
        &self,
        id: Uuid,
        user: &UserClaims,
        proposed: NaiveDate,
    ) -> AppResult<BookInstance> {
        self.renew_book_on(id, user, proposed, today()).await
    }

    pub(crate) async fn renew_book_on(
        &self,
        id: Uuid,
        user: &UserClaims,
        proposed: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<BookInstance> {
        user.require_permission(Permission::CanMarkReturned)?;

        self.store.get(id).await?;
        let due_back = self.policy.validate_renewal_date(proposed, today)?;

        let instance = self
            .store
            .set_due_back(id, due_back)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

        tracing::info!(
            "Book instance {} renewed by user {} until {}",
            id,
            user.user_id,
            due_back
        );
        Ok(instance.with_overdue_flag(today))
    }

    /// Return a copy on loan to the shelf
    pub async fn mark_returned(&self, id: Uuid, user: &UserClaims) -> AppResult<BookInstance> {
        user.require_permission(Permission::CanMarkReturned)?;

        let instance = self
            .store
            .mark_returned(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book instance {} on loan", id)))?;

        tracing::info!("Book instance {} returned by user {}", id, user.user_id);
        Ok(instance)
    }

    /// Copies the acting user currently has on loan, soonest due first
    pub async fn list_borrowed_by(
        &self,
        user: &UserClaims,
        pagination: Pagination,
    ) -> AppResult<(Vec<BookInstance>, i64)> {
        self.list_on_loan(Some(user.user_id), pagination).await
    }

    /// Every copy on loan, soonest due first (librarians only)
    pub async fn list_all_on_loan(
        &self,
        user: &UserClaims,
        pagination: Pagination,
    ) -> AppResult<(Vec<BookInstance>, i64)> {
        user.require_any(&[Permission::CanMarkReturned, Permission::CanViewAllLoans])?;
        self.list_on_loan(None, pagination).await
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        pagination: Pagination,
    ) -> AppResult<(Vec<BookInstance>, i64)> {
        let per_page = self.policy.page_size;
        let (instances, total) = self
            .store
            .list_on_loan(borrower_id, pagination.per_page(per_page), pagination.offset(per_page))
            .await?;

        let today = today();
        Ok((
            instances
                .into_iter()
                .map(|i| i.with_overdue_flag(today))
                .collect(),
            total,
        ))
    }
}
