//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Home page statistics
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub counts: CatalogCounts,
    /// Word searched for in titles
    pub title_word: String,
    /// Books whose title contains `title_word`, ignoring case
    pub books_with_word: i64,
}

#[derive(Serialize, ToSchema)]
pub struct CatalogCounts {
    pub books: i64,
    /// Physical copies
    pub instances: i64,
    pub instances_available: i64,
    pub instances_on_loan: i64,
    pub authors: i64,
    pub genres: i64,
}

/// Get catalog statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
