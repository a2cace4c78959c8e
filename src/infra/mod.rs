//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis-backed rate-limit counters
//! - Field encryption for NIK and phone columns
//! - File storage for complaint images
//! - Unit of Work for transaction management

pub mod cache;
pub mod crypto;
pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitDecision, RateLimitStore};
pub use crypto::FieldCipher;
pub use db::{Database, Migrator};
pub use repositories::{
    ComplaintRepository, ParticipantRepository, ReportRepository, TokenRepository,
    UserRepository, VisitRepository,
};
pub use storage::{FileStorage, LocalStorage};
pub use unit_of_work::{
    Persistence, TransactionContext, TxFuture, TxParticipantRepository, TxVisitRepository,
    UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockRateLimitStore;
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockFileStorage;
