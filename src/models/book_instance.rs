//! Book instance (physical copy) model and its status state machine

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Availability of a copy. Stored as a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    /// Whether an administrative edit may move a copy from `self` to `target`.
    ///
    /// Entering `OnLoan` only happens through a borrow, which also records the
    /// borrower and due date. Leaving `OnLoan` is allowed and acts as a return.
    pub fn allows_direct_edit(self, target: LoanStatus) -> bool {
        target != LoanStatus::OnLoan || self == LoanStatus::OnLoan
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status code: {}", other)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A physical copy of a book that can be borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
    // Computed fields (populated when queried with JOINs, None otherwise)
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub borrower_username: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl BookInstance {
    /// Overdue iff a due date is set and lies strictly before `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Refresh the serialized `is_overdue` flag
    pub fn with_overdue_flag(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.is_overdue_on(today);
        self
    }

    /// Apply an administrative edit, enforcing the status transition table.
    pub fn apply_update(&mut self, update: UpdateBookInstance) -> Result<(), AppError> {
        if let Some(target) = update.status {
            if !self.status.allows_direct_edit(target) {
                return Err(AppError::Conflict(format!(
                    "Cannot change status from {} to {}; copies go on loan only by borrowing",
                    self.status, target
                )));
            }
            if self.status == LoanStatus::OnLoan && target != LoanStatus::OnLoan {
                self.borrower_id = None;
                self.due_back = None;
            }
            self.status = target;
        }
        if let Some(imprint) = update.imprint {
            self.imprint = imprint;
        }
        if let Some(book_id) = update.book_id {
            self.book_id = Some(book_id);
        }
        Ok(())
    }
}

/// Create book instance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: i32,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    /// Initial status (default: maintenance); cannot be `on_loan`
    pub status: Option<LoanStatus>,
}

/// Administrative edit of a book instance
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    pub book_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: Option<String>,
    pub status: Option<LoanStatus>,
}

/// Renewal form submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewBookRequest {
    /// New due date, between today and 4 weeks ahead
    pub renewal_date: NaiveDate,
}

/// Renewal form initial state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalProposal {
    pub instance: BookInstance,
    /// Suggested due date (default: 3 weeks from today)
    pub proposed_renewal_date: NaiveDate,
    /// Latest accepted due date
    pub max_renewal_date: NaiveDate,
}
