//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health, instances, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "1.0.0",
        description = "Library catalog and loan workflow REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Stats
        stats::get_stats,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres and languages
        genres::list_genres,
        genres::create_genre,
        genres::list_languages,
        genres::create_language,
        // Book instances
        instances::create_instance,
        instances::get_instance,
        instances::update_instance,
        // Loans
        loans::borrow_book,
        loans::renewal_proposal,
        loans::renew_book,
        loans::mark_returned,
        loans::list_my_loans,
        loans::list_all_loans,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::UserInfo,
            crate::models::user::Permission,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookInput,
            crate::api::BookPage,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorBook,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorInput,
            crate::api::AuthorPage,
            // Genres and languages
            crate::models::genre::Genre,
            crate::models::genre::Language,
            crate::models::genre::CreateLabel,
            // Book instances and loans
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::RenewBookRequest,
            crate::models::book_instance::RenewalProposal,
            crate::api::BookInstancePage,
            // Stats
            stats::StatsResponse,
            stats::CatalogCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "stats", description = "Home page statistics"),
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genres and languages"),
        (name = "instances", description = "Physical copies of books"),
        (name = "loans", description = "Borrowing, renewal and return")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_loan_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/instances/{id}/borrow"));
        assert!(doc.paths.paths.contains_key("/instances/{id}/renew"));
        assert!(doc.paths.paths.contains_key("/loans/mine"));
    }
}
