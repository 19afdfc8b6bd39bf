//! Genre and language endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        genre::{CreateLabel, Genre, Language},
        user::Permission,
    },
};

use super::AuthenticatedUser;

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateLabel,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 403, description = "Missing can_edit_book")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CreateLabel>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require_permission(Permission::CanEditBook)?;
    let input = input.trimmed();
    input.validate()?;

    let genre = state.services.catalog.create_genre(&input.name).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// List languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "genres",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateLabel,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 403, description = "Missing can_edit_book")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CreateLabel>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_permission(Permission::CanEditBook)?;
    let input = input.trimmed();
    input.validate()?;

    let language = state.services.catalog.create_language(&input.name).await?;
    Ok((StatusCode::CREATED, Json(language)))
}
