//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits; this container wires them to the
//! unit of work, configuration and file storage once at startup.

use std::sync::Arc;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, ComplaintManager,
    ComplaintService, DashboardManager, DashboardService, ParticipantManager,
    ParticipantService, VisitManager, VisitService,
};
use crate::config::Config;
use crate::infra::{FieldCipher, FileStorage, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn accounts(&self) -> Arc<dyn AccountService>;

    fn participants(&self) -> Arc<dyn ParticipantService>;

    fn visits(&self) -> Arc<dyn VisitService>;

    fn complaints(&self) -> Arc<dyn ComplaintService>;

    fn dashboard(&self) -> Arc<dyn DashboardService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    account_service: Arc<dyn AccountService>,
    participant_service: Arc<dyn ParticipantService>,
    visit_service: Arc<dyn VisitService>,
    complaint_service: Arc<dyn ComplaintService>,
    dashboard_service: Arc<dyn DashboardService>,
}

impl Services {
    /// Build every service over one shared unit of work.
    pub fn from_connection(
        db: Arc<sea_orm::DatabaseConnection>,
        config: Config,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        let cipher = FieldCipher::new(config.field_encryption_key());
        let uow = Arc::new(Persistence::new(db, cipher));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            account_service: Arc::new(AccountManager::new(uow.clone())),
            participant_service: Arc::new(ParticipantManager::new(uow.clone())),
            visit_service: Arc::new(VisitManager::new(uow.clone())),
            complaint_service: Arc::new(ComplaintManager::new(uow.clone(), storage)),
            dashboard_service: Arc::new(DashboardManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn participants(&self) -> Arc<dyn ParticipantService> {
        self.participant_service.clone()
    }

    fn visits(&self) -> Arc<dyn VisitService> {
        self.visit_service.clone()
    }

    fn complaints(&self) -> Arc<dyn ComplaintService> {
        self.complaint_service.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }
}
