//! Visit use cases. The examination table is picked from the category of
//! the visited participant, read inside the same transaction as the insert.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use std::sync::Arc;

use crate::domain::{
    CurrentUser, NewVisit, ParticipantRef, VisitDetail, VisitDetailFields, VisitDetails,
    VisitPatch, VisitQuery,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VisitService: Send + Sync {
    async fn list(
        &self,
        query: VisitQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<VisitDetails>>;

    /// Record a visit by `actor` with its examination record.
    async fn create(
        &self,
        actor: &CurrentUser,
        visit: NewVisit,
        fields: VisitDetailFields,
    ) -> AppResult<VisitDetails>;

    async fn get(&self, id: i64) -> AppResult<VisitDetails>;

    /// Patch the visit and its examination record; the participant is
    /// never written.
    async fn update(
        &self,
        id: i64,
        patch: VisitPatch,
        fields: VisitDetailFields,
    ) -> AppResult<VisitDetails>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub struct VisitManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> VisitManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> VisitService for VisitManager<U> {
    async fn list(
        &self,
        query: VisitQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<VisitDetails>> {
        let (rows, total) = self.uow.visits().list(query, page).await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn create(
        &self,
        actor: &CurrentUser,
        mut visit: NewVisit,
        fields: VisitDetailFields,
    ) -> AppResult<VisitDetails> {
        visit.created_by = Some(actor.id);

        let (visit, peserta, detail) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let participant = ctx
                        .participants()
                        .find_by_id(visit.peserta_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::validation("peserta_id", "Peserta tidak ditemukan")
                        })?;

                    let detail = VisitDetail::build(participant.kategori, &fields);
                    let (visit, detail) = ctx.visits().create_with_detail(visit, detail).await?;
                    let peserta = ParticipantRef {
                        id: participant.id,
                        nama: participant.nama,
                        kategori: participant.kategori,
                    };
                    Ok((visit, peserta, detail))
                })
            })
            .await?;

        tracing::info!(
            kunjungan_id = visit.id,
            peserta_id = peserta.id,
            user_id = %actor.id,
            "Visit recorded"
        );
        Ok(VisitDetails {
            visit,
            peserta,
            detail: Some(detail),
        })
    }

    async fn get(&self, id: i64) -> AppResult<VisitDetails> {
        self.uow
            .visits()
            .find_details(id)
            .await?
            .ok_or_not_found("Kunjungan")
    }

    async fn update(
        &self,
        id: i64,
        patch: VisitPatch,
        fields: VisitDetailFields,
    ) -> AppResult<VisitDetails> {
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move { ctx.visits().update_with_detail(id, patch, &fields).await })
            })
            .await?;

        tracing::info!(kunjungan_id = id, "Visit updated");
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.uow.visits().delete(id).await?;
        tracing::info!(kunjungan_id = id, "Visit deleted");
        Ok(())
    }
}
