//! Loan workflow endpoints: borrow, renew, return and loan lists

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, RenewBookRequest, RenewalProposal},
        Pagination,
    },
};

use super::{AuthenticatedUser, BookInstancePage, PaginatedResponse};

/// Borrow an available copy
#[utoipa::path(
    post,
    path = "/instances/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy is now on loan to the caller", body = BookInstance),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No available copy with this ID")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.loans.borrow_book(id, &claims).await?;
    Ok(Json(instance))
}

/// Renewal form: the copy with the proposed and latest due dates
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal proposal", body = RenewalProposal),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_proposal(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalProposal>> {
    let proposal = state.services.loans.renewal_proposal(id, &claims).await?;
    Ok(Json(proposal))
}

/// Set a new due date on a copy
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookRequest,
    responses(
        (status = 200, description = "Due date updated", body = BookInstance),
        (status = 400, description = "Renewal date outside the allowed window"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewBookRequest>,
) -> AppResult<Json<BookInstance>> {
    let instance = state
        .services
        .loans
        .renew_book(id, &claims, request.renewal_date)
        .await?;
    Ok(Json(instance))
}

/// Check a copy back in
#[utoipa::path(
    post,
    path = "/instances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy is available again", body = BookInstance),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "No copy on loan with this ID")
    )
)]
pub async fn mark_returned(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.loans.mark_returned(id, &claims).await?;
    Ok(Json(instance))
}

/// Copies on loan to the caller
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(Pagination),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = BookInstancePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<BookInstancePage>> {
    let loans = &state.services.loans;
    let (items, total) = loans.list_borrowed_by(&claims, pagination).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: pagination.page(),
        per_page: pagination.per_page(loans.policy().page_size),
    }))
}

/// Every copy on loan
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(Pagination),
    responses(
        (status = 200, description = "All loans, soonest due first", body = BookInstancePage),
        (status = 403, description = "Missing can_mark_returned or can_view_all_loans")
    )
)]
pub async fn list_all_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<BookInstancePage>> {
    let loans = &state.services.loans;
    let (items, total) = loans.list_all_on_loan(&claims, pagination).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: pagination.page(),
        per_page: pagination.per_page(loans.policy().page_size),
    }))
}
