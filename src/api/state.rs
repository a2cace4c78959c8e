//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::net::IpAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, FileStorage, LocalStorage, RateLimitStore};
use crate::services::{
    AccountService, AuthService, ComplaintService, DashboardService, ParticipantService,
    ServiceContainer, Services, VisitService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub account_service: Arc<dyn AccountService>,
    pub participant_service: Arc<dyn ParticipantService>,
    pub visit_service: Arc<dyn VisitService>,
    pub complaint_service: Arc<dyn ComplaintService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    /// Redis-backed request counters
    pub rate_limits: Arc<dyn RateLimitStore>,
    /// Database connection
    pub database: Arc<Database>,
    /// Reverse proxies whose forwarded-for headers identify the client
    pub trusted_proxies: Arc<[IpAddr]>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// Complaint images go to local disk under `config.upload_dir`.
    pub fn from_config(
        database: Arc<Database>,
        rate_limits: Arc<dyn RateLimitStore>,
        config: Config,
    ) -> Self {
        let storage: Arc<dyn FileStorage> = Arc::new(LocalStorage::new(config.upload_dir.clone()));
        let trusted_proxies = config.trusted_proxy_ips.clone();
        let container = Services::from_connection(database.get_connection(), config, storage);
        Self::new(&container, rate_limits, database).with_trusted_proxies(trusted_proxies)
    }

    /// Create application state from any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        rate_limits: Arc<dyn RateLimitStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            account_service: services.accounts(),
            participant_service: services.participants(),
            visit_service: services.visits(),
            complaint_service: services.complaints(),
            dashboard_service: services.dashboard(),
            rate_limits,
            database,
            trusted_proxies: Arc::from(Vec::new()),
        }
    }

    /// Honour forwarded-for headers from these peers only.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::from(proxies);
        self
    }
}
