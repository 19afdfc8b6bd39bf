//! LocalLibrary server
//!
//! REST JSON API for a small library catalog: books, authors, genres,
//! physical copies, and the loan workflow that moves copies between
//! the shelf and borrowers.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
