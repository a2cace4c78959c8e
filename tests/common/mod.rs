//! Shared fixtures for service tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use posyandu_api::domain::{hash_nik, CurrentUser, Password, User, UserRole};
use posyandu_api::errors::{AppError, AppResult};
use posyandu_api::infra::repositories::{
    MockComplaintRepository, MockParticipantRepository, MockReportRepository,
    MockTokenRepository, MockUserRepository, MockVisitRepository,
};
use posyandu_api::infra::{
    ComplaintRepository, ParticipantRepository, ReportRepository, TokenRepository, TxFuture,
    TransactionContext, UnitOfWork, UserRepository, VisitRepository,
};

pub mod rows;

pub const TEST_PASSWORD: &str = "rahasia123";
pub const TEST_NIK: &str = "3201010101010001";

/// Mock repositories, configured before being frozen into a [`TestUnitOfWork`].
#[derive(Default)]
pub struct MockRepos {
    pub users: MockUserRepository,
    pub tokens: MockTokenRepository,
    pub participants: MockParticipantRepository,
    pub visits: MockVisitRepository,
    pub complaints: MockComplaintRepository,
    pub reports: MockReportRepository,
}

impl MockRepos {
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            tokens: Arc::new(self.tokens),
            participants: Arc::new(self.participants),
            visits: Arc::new(self.visits),
            complaints: Arc::new(self.complaints),
            reports: Arc::new(self.reports),
        })
    }
}

/// Test mock for UnitOfWork that wraps the mock repositories
pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    tokens: Arc<MockTokenRepository>,
    participants: Arc<MockParticipantRepository>,
    visits: Arc<MockVisitRepository>,
    complaints: Arc<MockComplaintRepository>,
    reports: Arc<MockReportRepository>,
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.tokens.clone()
    }

    fn participants(&self) -> Arc<dyn ParticipantRepository> {
        self.participants.clone()
    }

    fn visits(&self) -> Arc<dyn VisitRepository> {
        self.visits.clone()
    }

    fn complaints(&self) -> Arc<dyn ComplaintRepository> {
        self.complaints.clone()
    }

    fn reports(&self) -> Arc<dyn ReportRepository> {
        self.reports.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // Transactional paths are covered against a mock database connection
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

/// A kader account whose password is [`TEST_PASSWORD`] and NIK [`TEST_NIK`].
pub fn kader_user(id: Uuid) -> User {
    let password_hash = Password::new(TEST_PASSWORD)
        .expect("hash test password")
        .into_string();
    User {
        id,
        name: "Siti Aminah".to_string(),
        email: "siti@posyandu.id".to_string(),
        password_hash,
        role: UserRole::Kader,
        nik: Some(TEST_NIK.to_string()),
        nik_hash: Some(hash_nik(TEST_NIK)),
        phone_number: Some("081234567890".to_string()),
        avatar_url: None,
        failed_login_attempts: 0,
        locked_until: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn actor(role: UserRole) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        email: format!("{}@posyandu.id", role),
        role,
        token_id: Uuid::new_v4(),
    }
}
