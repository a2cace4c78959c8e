//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the transaction boundary for the
//! master+detail writes of participants and visits: both rows commit or
//! neither does.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::crypto::FieldCipher;
use super::repositories::{
    extension::{update_extension, CategoryExtension},
    participant_repository::{find_participant, insert_participant, update_participant},
    visit_repository::{find_visit_with_kategori, insert_visit, update_visit},
    ComplaintRepository, ComplaintStore, ParticipantRepository, ParticipantStore,
    ReportRepository, ReportStore, TokenRepository, TokenStore, UserRepository, UserStore,
    VisitRepository, VisitStore,
};
use crate::domain::{
    ExtensionFields, NewParticipant, NewVisit, Participant, ParticipantExtension,
    ParticipantPatch, Visit, VisitDetail, VisitDetailFields, VisitPatch,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction methods; tests
/// implement it over mock repositories instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn tokens(&self) -> Arc<dyn TokenRepository>;

    fn participants(&self) -> Arc<dyn ParticipantRepository>;

    fn visits(&self) -> Arc<dyn VisitRepository>;

    fn complaints(&self) -> Arc<dyn ComplaintRepository>;

    fn reports(&self) -> Arc<dyn ReportRepository>;

    /// Run `f` inside a ReadCommitted transaction, committing on `Ok` and
    /// rolling back on `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
    cipher: &'a FieldCipher,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction, cipher: &'a FieldCipher) -> Self {
        Self { txn, cipher }
    }

    pub fn participants(&self) -> TxParticipantRepository<'_> {
        TxParticipantRepository {
            txn: self.txn,
            cipher: self.cipher,
        }
    }

    pub fn visits(&self) -> TxVisitRepository<'_> {
        TxVisitRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
///
/// Every store shares the one connection handle.
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    cipher: FieldCipher,
    user_repo: Arc<UserStore>,
    token_repo: Arc<TokenStore>,
    participant_repo: Arc<ParticipantStore>,
    visit_repo: Arc<VisitStore>,
    complaint_repo: Arc<ComplaintStore>,
    report_repo: Arc<ReportStore>,
}

impl Persistence {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>, cipher: FieldCipher) -> Self {
        let db = db.into();
        Self {
            user_repo: Arc::new(UserStore::new(db.clone(), cipher.clone())),
            token_repo: Arc::new(TokenStore::new(db.clone())),
            participant_repo: Arc::new(ParticipantStore::new(db.clone(), cipher.clone())),
            visit_repo: Arc::new(VisitStore::new(db.clone())),
            complaint_repo: Arc::new(ComplaintStore::new(db.clone())),
            report_repo: Arc::new(ReportStore::new(db.clone())),
            db,
            cipher,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn, &self.cipher);

        match f(ctx).await {
            Ok(result) => {
                txn.commit()
                    .await
                    .map_err(|e| AppError::from(e).into_transaction_failure())?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                tracing::warn!(error = %e, "Transaction rolled back");
                Err(e.into_transaction_failure())
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }

    fn participants(&self) -> Arc<dyn ParticipantRepository> {
        self.participant_repo.clone()
    }

    fn visits(&self) -> Arc<dyn VisitRepository> {
        self.visit_repo.clone()
    }

    fn complaints(&self) -> Arc<dyn ComplaintRepository> {
        self.complaint_repo.clone()
    }

    fn reports(&self) -> Arc<dyn ReportRepository> {
        self.report_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }

}

/// Participant writes within a transaction.
pub struct TxParticipantRepository<'a> {
    txn: &'a DatabaseTransaction,
    cipher: &'a FieldCipher,
}

impl TxParticipantRepository<'_> {
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        find_participant(self.txn, self.cipher, id).await
    }

    /// Insert the master row, then its one extension keyed by the new id.
    pub async fn create_with_extension(
        &self,
        new: NewParticipant,
        extension: ParticipantExtension,
    ) -> AppResult<(Participant, ParticipantExtension)> {
        if extension.shape() != new.kategori.shape() {
            return Err(AppError::internal(format!(
                "Extension {:?} does not belong to kategori {}",
                extension.shape(),
                new.kategori
            )));
        }

        let participant = insert_participant(self.txn, self.cipher, new).await?;
        extension.insert(self.txn, participant.id).await?;
        tracing::debug!(
            peserta_id = participant.id,
            kategori = %participant.kategori,
            "Participant created with extension"
        );
        Ok((participant, extension))
    }

    /// Patch the master row and the existing extension. A missing extension
    /// row is left missing.
    pub async fn update_with_extension(
        &self,
        id: i64,
        patch: ParticipantPatch,
        fields: &ExtensionFields,
    ) -> AppResult<Participant> {
        let participant = update_participant(self.txn, self.cipher, id, patch).await?;
        update_extension::<ParticipantExtension, _, _>(
            self.txn,
            id,
            participant.kategori.shape(),
            |extension| extension.apply(fields),
        )
        .await?;
        Ok(participant)
    }
}

/// Visit writes within a transaction. Participant rows are only read.
pub struct TxVisitRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxVisitRepository<'_> {
    /// Insert the visit and the examination record matching the category of
    /// its participant.
    pub async fn create_with_detail(
        &self,
        new: NewVisit,
        detail: VisitDetail,
    ) -> AppResult<(Visit, VisitDetail)> {
        let visit = insert_visit(self.txn, new).await?;
        detail.insert(self.txn, visit.id).await?;
        Ok((visit, detail))
    }

    /// Patch the visit row and its existing examination record.
    pub async fn update_with_detail(
        &self,
        id: i64,
        patch: VisitPatch,
        fields: &VisitDetailFields,
    ) -> AppResult<Visit> {
        let (_, kategori) = find_visit_with_kategori(self.txn, id)
            .await?
            .ok_or(AppError::NotFound("Kunjungan"))?;

        let visit = update_visit(self.txn, id, patch).await?;
        update_extension::<VisitDetail, _, _>(self.txn, id, kategori.shape(), |detail| {
            detail.apply(fields)
        })
        .await?;
        Ok(visit)
    }
}
