//! Participant repository: reads, listing and deletes over the master table.
//!
//! Master+extension writes run inside a transaction and live in the
//! connection-generic functions at the bottom of this module.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, Func, IntoCondition};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, FromQueryResult, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

use super::entities::{kunjungan, peserta};
use super::extension::CategoryExtension;
use crate::domain::{
    hash_nik, Kategori, NewParticipant, Nik, Participant, ParticipantDetails,
    ParticipantExtension, ParticipantPatch, ParticipantQuery, ParticipantSort, ParticipantSummary,
    SortOrder,
};
use crate::errors::{map_unique_violation, AppError, AppResult};
use crate::infra::crypto::FieldCipher;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>>;

    /// Participant with its one extension and the date of its latest visit.
    async fn find_details(&self, id: i64) -> AppResult<Option<ParticipantDetails>>;

    async fn find_by_nik_hash(&self, nik_hash: &str) -> AppResult<Option<Participant>>;

    /// Filtered, sorted page of participants (extension not loaded) and the
    /// total number of matches.
    async fn list(
        &self,
        query: ParticipantQuery,
        page: PaginationParams,
        today: NaiveDate,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)>;

    /// Short rows ordered by name.
    async fn summary(&self, limit: u64) -> AppResult<Vec<ParticipantSummary>>;

    /// Delete one participant with its visits and extension.
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Delete every existing id in one statement; returns rows removed.
    async fn bulk_delete(&self, ids: Vec<i64>) -> AppResult<u64>;
}

pub struct ParticipantStore {
    db: Arc<DatabaseConnection>,
    cipher: FieldCipher,
}

impl ParticipantStore {
    pub fn new(db: Arc<DatabaseConnection>, cipher: FieldCipher) -> Self {
        Self { db, cipher }
    }

    async fn find_one(&self, filter: impl IntoCondition) -> AppResult<Option<Participant>> {
        peserta::Entity::find()
            .filter(filter)
            .one(self.db.as_ref())
            .await?
            .map(|model| participant_from_model(&self.cipher, model))
            .transpose()
    }

    /// Latest visit date per participant among `ids`.
    async fn last_visit_dates(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, NaiveDate>> {
        #[derive(FromQueryResult)]
        struct LastVisit {
            peserta_id: i64,
            last_visit: Option<NaiveDate>,
        }

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = kunjungan::Entity::find()
            .select_only()
            .column(kunjungan::Column::PesertaId)
            .column_as(kunjungan::Column::TanggalKunjungan.max(), "last_visit")
            .filter(kunjungan::Column::PesertaId.is_in(ids))
            .group_by(kunjungan::Column::PesertaId)
            .into_model::<LastVisit>()
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.last_visit.map(|date| (row.peserta_id, date)))
            .collect())
    }
}

/// Translate listing filters into a WHERE condition.
fn list_condition(query: &ParticipantQuery, today: NaiveDate) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        let mut any = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(peserta::Column::Nama))).like(pattern));
        if crate::domain::nik::is_nik(search) {
            any = any.add(peserta::Column::NikHash.eq(hash_nik(search)));
        }
        condition = condition.add(any);
    }
    if let Some(kategori) = query.kategori {
        condition = condition.add(peserta::Column::Kategori.eq(kategori.as_str()));
    }
    if let Some(jenis_kelamin) = query.jenis_kelamin {
        condition = condition.add(peserta::Column::JenisKelamin.eq(jenis_kelamin.as_str()));
    }
    let bounds = query.birth_date_bounds(today);
    if let Some(date) = bounds.born_on_or_before {
        condition = condition.add(peserta::Column::TanggalLahir.lte(date));
    }
    if let Some(date) = bounds.born_on_or_after {
        condition = condition.add(peserta::Column::TanggalLahir.gte(date));
    }
    if let Some(rt) = &query.rt {
        condition = condition.add(peserta::Column::Rt.eq(rt.as_str()));
    }
    if let Some(rw) = &query.rw {
        condition = condition.add(peserta::Column::Rw.eq(rw.as_str()));
    }
    condition
}

#[async_trait]
impl ParticipantRepository for ParticipantStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Participant>> {
        self.find_one(peserta::Column::Id.eq(id)).await
    }

    async fn find_details(&self, id: i64) -> AppResult<Option<ParticipantDetails>> {
        let Some(participant) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let extension =
            ParticipantExtension::load(self.db.as_ref(), id, participant.kategori.shape()).await?;
        let last_visit_date = self.last_visit_dates(vec![id]).await?.remove(&id);

        Ok(Some(ParticipantDetails {
            participant,
            extension,
            last_visit_date,
        }))
    }

    async fn find_by_nik_hash(&self, nik_hash: &str) -> AppResult<Option<Participant>> {
        self.find_one(peserta::Column::NikHash.eq(nik_hash)).await
    }

    async fn list(
        &self,
        query: ParticipantQuery,
        page: PaginationParams,
        today: NaiveDate,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)> {
        let column = match query.sort_by {
            ParticipantSort::Nama => peserta::Column::Nama,
            ParticipantSort::TanggalLahir => peserta::Column::TanggalLahir,
            ParticipantSort::CreatedAt => peserta::Column::CreatedAt,
        };
        let order = match query.sort_order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let paginator = peserta::Entity::find()
            .filter(list_condition(&query, today))
            .order_by(column, order)
            .order_by_desc(peserta::Column::Id)
            .paginate(self.db.as_ref(), page.per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let mut last_visits = self
            .last_visit_dates(models.iter().map(|m| m.id).collect())
            .await?;

        let rows = models
            .into_iter()
            .map(|model| {
                let last_visit_date = last_visits.remove(&model.id);
                Ok(ParticipantDetails {
                    participant: participant_from_model(&self.cipher, model)?,
                    extension: None,
                    last_visit_date,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((rows, total))
    }

    async fn summary(&self, limit: u64) -> AppResult<Vec<ParticipantSummary>> {
        peserta::Entity::find()
            .order_by_asc(peserta::Column::Nama)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|model| {
                let participant = participant_from_model(&self.cipher, model)?;
                Ok(ParticipantSummary {
                    id: participant.id,
                    nama: participant.nama,
                    nik: participant.nik,
                    kategori: participant.kategori,
                    jenis_kelamin: participant.jenis_kelamin,
                })
            })
            .collect()
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = peserta::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Peserta"));
        }
        Ok(())
    }

    async fn bulk_delete(&self, ids: Vec<i64>) -> AppResult<u64> {
        let result = peserta::Entity::delete_many()
            .filter(peserta::Column::Id.is_in(ids))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

// =============================================================================
// Connection-generic helpers shared with the transaction context
// =============================================================================

pub(crate) fn participant_from_model(
    cipher: &FieldCipher,
    model: peserta::Model,
) -> AppResult<Participant> {
    Ok(Participant {
        id: model.id,
        nik: cipher.decrypt(&model.nik)?,
        telepon: cipher.decrypt_opt(model.telepon.as_deref())?,
        nama: model.nama,
        kategori: model.kategori.parse::<Kategori>()?,
        tanggal_lahir: model.tanggal_lahir,
        jenis_kelamin: model.jenis_kelamin.parse()?,
        alamat: model.alamat,
        rt: model.rt,
        rw: model.rw,
        kepesertaan_bpjs: model.kepesertaan_bpjs,
        nomor_bpjs: model.nomor_bpjs,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub(crate) async fn find_participant<C>(
    conn: &C,
    cipher: &FieldCipher,
    id: i64,
) -> AppResult<Option<Participant>>
where
    C: ConnectionTrait,
{
    peserta::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|model| participant_from_model(cipher, model))
        .transpose()
}

pub(crate) async fn insert_participant<C>(
    conn: &C,
    cipher: &FieldCipher,
    new: NewParticipant,
) -> AppResult<Participant>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = peserta::ActiveModel {
        id: NotSet,
        nik: Set(cipher.encrypt(new.nik.as_str())?),
        nik_hash: Set(new.nik.hash()),
        nama: Set(new.nama),
        kategori: Set(new.kategori.as_str().to_string()),
        tanggal_lahir: Set(new.tanggal_lahir),
        jenis_kelamin: Set(new.jenis_kelamin.as_str().to_string()),
        alamat: Set(new.alamat),
        rt: Set(new.rt),
        rw: Set(new.rw),
        telepon: Set(cipher.encrypt_opt(new.telepon.as_deref())?),
        kepesertaan_bpjs: Set(new.kepesertaan_bpjs),
        nomor_bpjs: Set(new.nomor_bpjs),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| map_unique_violation(e, "NIK"))?;

    participant_from_model(cipher, model)
}

/// Apply a master patch. Kategori is never written; a new NIK is encrypted
/// and re-hashed in the same statement.
pub(crate) async fn update_participant<C>(
    conn: &C,
    cipher: &FieldCipher,
    id: i64,
    patch: ParticipantPatch,
) -> AppResult<Participant>
where
    C: ConnectionTrait,
{
    let model = peserta::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("Peserta"))?;

    let mut active: peserta::ActiveModel = model.into();
    if let Some(nik) = patch.nik {
        set_nik(&mut active, cipher, &nik)?;
    }
    if let Some(nama) = patch.nama {
        active.nama = Set(nama);
    }
    if let Some(tanggal_lahir) = patch.tanggal_lahir {
        active.tanggal_lahir = Set(tanggal_lahir);
    }
    if let Some(jenis_kelamin) = patch.jenis_kelamin {
        active.jenis_kelamin = Set(jenis_kelamin.as_str().to_string());
    }
    if let Some(alamat) = patch.alamat {
        active.alamat = Set(Some(alamat));
    }
    if let Some(rt) = patch.rt {
        active.rt = Set(Some(rt));
    }
    if let Some(rw) = patch.rw {
        active.rw = Set(Some(rw));
    }
    if let Some(telepon) = patch.telepon {
        active.telepon = Set(Some(cipher.encrypt(&telepon)?));
    }
    if let Some(kepesertaan_bpjs) = patch.kepesertaan_bpjs {
        active.kepesertaan_bpjs = Set(kepesertaan_bpjs);
    }
    if let Some(nomor_bpjs) = patch.nomor_bpjs {
        active.nomor_bpjs = Set(Some(nomor_bpjs));
    }
    active.updated_at = Set(Utc::now());

    let model = active
        .update(conn)
        .await
        .map_err(|e| map_unique_violation(e, "NIK"))?;
    participant_from_model(cipher, model)
}

fn set_nik(active: &mut peserta::ActiveModel, cipher: &FieldCipher, nik: &Nik) -> AppResult<()> {
    active.nik = Set(cipher.encrypt(nik.as_str())?);
    active.nik_hash = Set(nik.hash());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JenisKelamin;
    use sea_orm::{DbBackend, QueryTrait};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    /// SQL after `WHERE`; the select list always names every column.
    fn where_clause(query: &ParticipantQuery) -> String {
        let sql = peserta::Entity::find()
            .filter(list_condition(query, today()))
            .build(DbBackend::Postgres)
            .to_string();
        sql.split_once(" WHERE ")
            .map(|(_, condition)| condition.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn empty_query_has_no_filters() {
        // An empty condition renders as `TRUE`, never a column comparison
        assert!(!where_clause(&ParticipantQuery::default()).contains('"'));
    }

    #[test]
    fn nik_search_also_matches_hash() {
        let sql = where_clause(&ParticipantQuery {
            search: Some("1234567890123456".into()),
            ..Default::default()
        });
        assert!(sql.contains("LOWER(\"nama\") LIKE '%1234567890123456%'"));
        assert!(sql.contains(&hash_nik("1234567890123456")));
    }

    #[test]
    fn name_search_does_not_touch_hash() {
        let sql = where_clause(&ParticipantQuery {
            search: Some("Siti".into()),
            ..Default::default()
        });
        assert!(sql.contains("'%siti%'"));
        assert!(!sql.contains("nik_hash"));
    }

    #[test]
    fn filters_combine() {
        let sql = where_clause(&ParticipantQuery {
            kategori: Some(Kategori::Lansia),
            jenis_kelamin: Some(JenisKelamin::Perempuan),
            min_age: Some(60),
            rt: Some("003".into()),
            ..Default::default()
        });
        assert!(sql.contains("\"kategori\" = 'lansia'"));
        assert!(sql.contains("\"jenis_kelamin\" = 'Perempuan'"));
        assert!(sql.contains("\"tanggal_lahir\" <= '1966-06-15'"));
        assert!(sql.contains("\"rt\" = '003'"));
    }
}
