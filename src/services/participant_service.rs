//! Participant use cases. Master and extension rows are always written
//! together inside one transaction.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use chrono::Utc;
use std::sync::Arc;

use crate::config::DEFAULT_SUMMARY_LIMIT;
use crate::domain::{
    ExtensionFields, LatestVisit, NewParticipant, ParticipantDetails, ParticipantExtension,
    ParticipantPatch, ParticipantQuery, ParticipantSummary,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

const DUPLICATE_NIK: &str = "NIK sudah terdaftar dalam sistem";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ParticipantService: Send + Sync {
    async fn list(
        &self,
        query: ParticipantQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>>;

    async fn summary(&self, limit: Option<u64>) -> AppResult<Vec<ParticipantSummary>>;

    /// Register a participant with the extension its category requires.
    async fn create(
        &self,
        participant: NewParticipant,
        fields: ExtensionFields,
    ) -> AppResult<ParticipantDetails>;

    async fn get(&self, id: i64) -> AppResult<ParticipantDetails>;

    /// Patch master fields and the existing extension. Kategori never changes.
    async fn update(
        &self,
        id: i64,
        patch: ParticipantPatch,
        fields: ExtensionFields,
    ) -> AppResult<ParticipantDetails>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Delete whichever of `ids` exist; returns how many were removed.
    async fn bulk_delete(&self, ids: Vec<i64>) -> AppResult<u64>;

    async fn latest_visit(&self, id: i64) -> AppResult<LatestVisit>;
}

pub struct ParticipantManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ParticipantManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Reject a NIK already held by a participant other than `except`.
    async fn ensure_nik_free(&self, nik_hash: &str, except: Option<i64>) -> AppResult<()> {
        match self.uow.participants().find_by_nik_hash(nik_hash).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(AppError::validation("nik", DUPLICATE_NIK))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ParticipantService for ParticipantManager<U> {
    async fn list(
        &self,
        query: ParticipantQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>> {
        let today = Utc::now().date_naive();
        let (rows, total) = self.uow.participants().list(query, page, today).await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn summary(&self, limit: Option<u64>) -> AppResult<Vec<ParticipantSummary>> {
        self.uow
            .participants()
            .summary(limit.unwrap_or(DEFAULT_SUMMARY_LIMIT).max(1))
            .await
    }

    async fn create(
        &self,
        participant: NewParticipant,
        fields: ExtensionFields,
    ) -> AppResult<ParticipantDetails> {
        let extension = ParticipantExtension::build(participant.kategori, &fields)?;
        self.ensure_nik_free(&participant.nik.hash(), None).await?;

        let (participant, extension) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.participants()
                        .create_with_extension(participant, extension)
                        .await
                })
            })
            .await?;

        tracing::info!(
            peserta_id = participant.id,
            kategori = %participant.kategori,
            "Participant registered"
        );
        Ok(ParticipantDetails {
            participant,
            extension: Some(extension),
            last_visit_date: None,
        })
    }

    async fn get(&self, id: i64) -> AppResult<ParticipantDetails> {
        self.uow
            .participants()
            .find_details(id)
            .await?
            .ok_or_not_found("Peserta")
    }

    async fn update(
        &self,
        id: i64,
        patch: ParticipantPatch,
        fields: ExtensionFields,
    ) -> AppResult<ParticipantDetails> {
        self.uow
            .participants()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Peserta")?;
        if let Some(nik) = &patch.nik {
            self.ensure_nik_free(&nik.hash(), Some(id)).await?;
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.participants()
                        .update_with_extension(id, patch, &fields)
                        .await
                })
            })
            .await?;

        tracing::info!(peserta_id = id, "Participant updated");
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.uow.participants().delete(id).await?;
        tracing::info!(peserta_id = id, "Participant deleted");
        Ok(())
    }

    async fn bulk_delete(&self, ids: Vec<i64>) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::validation("ids", "Pilih minimal satu peserta"));
        }
        let requested = ids.len();
        let deleted = self.uow.participants().bulk_delete(ids).await?;
        tracing::info!(requested, deleted, "Participants bulk deleted");
        Ok(deleted)
    }

    async fn latest_visit(&self, id: i64) -> AppResult<LatestVisit> {
        self.uow
            .participants()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Peserta")?;
        self.uow
            .visits()
            .latest_for_participant(id)
            .await?
            .ok_or_not_found("Kunjungan")
    }
}
