//! Read-only aggregate queries for the dashboard.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QuerySelect, Statement,
};

use super::entities::{kunjungan, peserta};
use crate::domain::Kategori;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const VISITS_BY_MONTH_SQL: &str = r#"
SELECT date_trunc('month', k.tanggal_kunjungan)::date AS month,
       p.kategori AS kategori,
       COUNT(*) AS total
FROM kunjungan k
JOIN peserta p ON p.id = k.peserta_id
WHERE k.tanggal_kunjungan >= $1
GROUP BY 1, 2
"#;

const REGISTRATIONS_BY_MONTH_SQL: &str = r#"
SELECT date_trunc('month', created_at)::date AS month,
       COUNT(*) AS total
FROM peserta
WHERE EXTRACT(YEAR FROM created_at) = $1
GROUP BY 1
"#;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn count_participants(&self) -> AppResult<u64>;

    async fn count_participants_by_category(&self) -> AppResult<Vec<(Kategori, u64)>>;

    async fn count_visits_on(&self, date: NaiveDate) -> AppResult<u64>;

    /// `(month_start, kategori, visits)` for visits on or after `since`.
    async fn visits_by_month(&self, since: NaiveDate) -> AppResult<Vec<(NaiveDate, Kategori, u64)>>;

    /// `(month_start, registrations)` within `year`.
    async fn registrations_by_month(&self, year: i32) -> AppResult<Vec<(NaiveDate, u64)>>;
}

pub struct ReportStore {
    db: Arc<DatabaseConnection>,
}

impl ReportStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportRepository for ReportStore {
    async fn count_participants(&self) -> AppResult<u64> {
        Ok(peserta::Entity::find().count(self.db.as_ref()).await?)
    }

    async fn count_participants_by_category(&self) -> AppResult<Vec<(Kategori, u64)>> {
        #[derive(FromQueryResult)]
        struct Row {
            kategori: String,
            total: i64,
        }

        peserta::Entity::find()
            .select_only()
            .column(peserta::Column::Kategori)
            .column_as(peserta::Column::Id.count(), "total")
            .group_by(peserta::Column::Kategori)
            .into_model::<Row>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| Ok((row.kategori.parse()?, row.total.max(0) as u64)))
            .collect()
    }

    async fn count_visits_on(&self, date: NaiveDate) -> AppResult<u64> {
        Ok(kunjungan::Entity::find()
            .filter(kunjungan::Column::TanggalKunjungan.eq(date))
            .count(self.db.as_ref())
            .await?)
    }

    async fn visits_by_month(
        &self,
        since: NaiveDate,
    ) -> AppResult<Vec<(NaiveDate, Kategori, u64)>> {
        #[derive(FromQueryResult)]
        struct Row {
            month: NaiveDate,
            kategori: String,
            total: i64,
        }

        Row::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            VISITS_BY_MONTH_SQL,
            [since.into()],
        ))
        .all(self.db.as_ref())
        .await?
        .into_iter()
        .map(|row| Ok((row.month, row.kategori.parse()?, row.total.max(0) as u64)))
        .collect()
    }

    async fn registrations_by_month(&self, year: i32) -> AppResult<Vec<(NaiveDate, u64)>> {
        #[derive(FromQueryResult)]
        struct Row {
            month: NaiveDate,
            total: i64,
        }

        Ok(Row::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            REGISTRATIONS_BY_MONTH_SQL,
            [year.into()],
        ))
        .all(self.db.as_ref())
        .await?
        .into_iter()
        .map(|row| (row.month, row.total.max(0) as u64))
        .collect())
    }
}
