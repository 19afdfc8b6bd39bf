//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, AuthorInput, AUTHORS_PER_PAGE},
        user::Permission,
        Pagination,
    },
};

use super::{AuthenticatedUser, AuthorPage, PaginatedResponse};

/// List authors ordered by last name, first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(Pagination),
    responses(
        (status = 200, description = "List of authors", body = AuthorPage)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<AuthorPage>> {
    let (items, total) = state.services.catalog.list_authors(pagination).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: pagination.page(),
        per_page: pagination.per_page(AUTHORS_PER_PAGE),
    }))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing can_manage_authors")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<AuthorInput>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_permission(Permission::CanManageAuthors)?;
    input.validate()?;

    let created = state.services.catalog.create_author(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 403, description = "Missing can_manage_authors"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(input): Json<AuthorInput>,
) -> AppResult<Json<Author>> {
    claims.require_permission(Permission::CanManageAuthors)?;
    input.validate()?;

    let updated = state.services.catalog.update_author(id, input).await?;
    Ok(Json(updated))
}

/// Delete an author; their books stay in the catalog without an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Missing can_manage_authors"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_permission(Permission::CanManageAuthors)?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
