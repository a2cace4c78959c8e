//! Visit repository. Reads join the owning participant to learn which
//! examination table applies.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{kunjungan, peserta};
use super::extension::CategoryExtension;
use crate::domain::{
    Kategori, LatestVisit, NewVisit, ParticipantRef, Visit, VisitDetail, VisitDetails, VisitPatch,
    VisitQuery,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Visit with its participant and examination record.
    async fn find_details(&self, id: i64) -> AppResult<Option<VisitDetails>>;

    /// Newest first by visit date; rows carry their participant but no detail.
    async fn list(
        &self,
        query: VisitQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<VisitDetails>, u64)>;

    /// Most recent visit of a participant, if any.
    async fn latest_for_participant(&self, peserta_id: i64) -> AppResult<Option<LatestVisit>>;

    /// Delete a visit and its examination record.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub struct VisitStore {
    db: Arc<DatabaseConnection>,
}

impl VisitStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn participant_ref(model: peserta::Model) -> AppResult<ParticipantRef> {
    Ok(ParticipantRef {
        id: model.id,
        nama: model.nama,
        kategori: model.kategori.parse()?,
    })
}

/// The participant row of a visit must exist; the FK guarantees it.
fn require_participant(row: Option<peserta::Model>, visit_id: i64) -> AppResult<peserta::Model> {
    row.ok_or_else(|| AppError::internal(format!("Visit {} has no participant", visit_id)))
}

#[async_trait]
impl VisitRepository for VisitStore {
    async fn find_details(&self, id: i64) -> AppResult<Option<VisitDetails>> {
        let Some((model, owner)) = kunjungan::Entity::find_by_id(id)
            .find_also_related(peserta::Entity)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let peserta = participant_ref(require_participant(owner, id)?)?;
        let detail = VisitDetail::load(self.db.as_ref(), id, peserta.kategori.shape()).await?;

        Ok(Some(VisitDetails {
            visit: Visit::try_from(model)?,
            peserta,
            detail,
        }))
    }

    async fn list(
        &self,
        query: VisitQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<VisitDetails>, u64)> {
        let mut condition = Condition::all();
        if let Some(peserta_id) = query.peserta_id {
            condition = condition.add(kunjungan::Column::PesertaId.eq(peserta_id));
        }
        if let Some(start) = query.start_date {
            condition = condition.add(kunjungan::Column::TanggalKunjungan.gte(start));
        }
        if let Some(end) = query.end_date {
            condition = condition.add(kunjungan::Column::TanggalKunjungan.lte(end));
        }

        let paginator = kunjungan::Entity::find()
            .find_also_related(peserta::Entity)
            .filter(condition)
            .order_by_desc(kunjungan::Column::TanggalKunjungan)
            .order_by_desc(kunjungan::Column::Id)
            .paginate(self.db.as_ref(), page.per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page - 1).await?;

        let visits = rows
            .into_iter()
            .map(|(model, owner)| {
                let peserta = participant_ref(require_participant(owner, model.id)?)?;
                Ok(VisitDetails {
                    visit: Visit::try_from(model)?,
                    peserta,
                    detail: None,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((visits, total))
    }

    async fn latest_for_participant(&self, peserta_id: i64) -> AppResult<Option<LatestVisit>> {
        let Some((model, owner)) = kunjungan::Entity::find()
            .find_also_related(peserta::Entity)
            .filter(kunjungan::Column::PesertaId.eq(peserta_id))
            .order_by_desc(kunjungan::Column::TanggalKunjungan)
            .order_by_desc(kunjungan::Column::Id)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let kategori: Kategori = require_participant(owner, model.id)?.kategori.parse()?;
        let detail = VisitDetail::load(self.db.as_ref(), model.id, kategori.shape()).await?;
        Ok(Some(LatestVisit::new(Visit::try_from(model)?, kategori, detail)))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = kunjungan::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Kunjungan"));
        }
        Ok(())
    }
}

// =============================================================================
// Connection-generic helpers shared with the transaction context
// =============================================================================

/// A visit together with the category of its participant.
pub(crate) async fn find_visit_with_kategori<C>(
    conn: &C,
    id: i64,
) -> AppResult<Option<(Visit, Kategori)>>
where
    C: ConnectionTrait,
{
    let Some((model, owner)) = kunjungan::Entity::find_by_id(id)
        .find_also_related(peserta::Entity)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };
    let kategori = require_participant(owner, id)?.kategori.parse()?;
    Ok(Some((Visit::try_from(model)?, kategori)))
}

pub(crate) async fn insert_visit<C>(conn: &C, new: NewVisit) -> AppResult<Visit>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = kunjungan::ActiveModel {
        id: NotSet,
        peserta_id: Set(new.peserta_id),
        tanggal_kunjungan: Set(new.tanggal_kunjungan),
        berat_badan: Set(new.berat_badan),
        rujuk: Set(new.rujuk),
        lokasi: Set(new.lokasi.as_str().to_string()),
        created_by: Set(new.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    Visit::try_from(model)
}

/// Apply a master patch. Only the visit row is written.
pub(crate) async fn update_visit<C>(conn: &C, id: i64, patch: VisitPatch) -> AppResult<Visit>
where
    C: ConnectionTrait,
{
    let model = kunjungan::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("Kunjungan"))?;

    let mut active: kunjungan::ActiveModel = model.into();
    if let Some(tanggal) = patch.tanggal_kunjungan {
        active.tanggal_kunjungan = Set(tanggal);
    }
    if let Some(berat_badan) = patch.berat_badan {
        active.berat_badan = Set(Some(berat_badan));
    }
    if let Some(rujuk) = patch.rujuk {
        active.rujuk = Set(rujuk);
    }
    if let Some(lokasi) = patch.lokasi {
        active.lokasi = Set(lokasi.as_str().to_string());
    }
    active.updated_at = Set(Utc::now());

    Visit::try_from(active.update(conn).await?)
}
