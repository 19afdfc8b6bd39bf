//! Book instance (physical copy) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
        user::Permission,
    },
};

use super::AuthenticatedUser;

/// Add a copy of a book to the catalog
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Book instance created", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies cannot be created on loan")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    claims.require_permission(Permission::CanMarkReturned)?;
    input.validate()?;

    let created = state.services.catalog.create_instance(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a book instance by ID
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Book instance", body = BookInstance),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.catalog.get_instance(id).await?;
    Ok(Json(instance))
}

/// Edit a book instance. Loans go through borrow/return, not through this endpoint.
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstance),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Status transition not allowed")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    claims.require_permission(Permission::CanMarkReturned)?;
    input.validate()?;

    let updated = state.services.catalog.update_instance(id, input).await?;
    Ok(Json(updated))
}
