//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(
                Arc::new(repository.instances.clone()),
                loans::LoanPolicy::from(&config.loans),
            ),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }
}
