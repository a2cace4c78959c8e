//! Dashboard aggregates: headline counts, the twelve-month visit chart and
//! monthly registrations.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use chrono::{Datelike, Utc};
use std::sync::Arc;

use crate::domain::report::{bucket_registrations, bucket_visits, trailing_months};
use crate::domain::{CategoryCounts, DashboardStats, MonthlyRegistrations, MonthlyVisits};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn stats(&self) -> AppResult<DashboardStats>;

    /// Visits per month over the last twelve months, oldest first.
    async fn visit_chart(&self) -> AppResult<Vec<MonthlyVisits>>;

    /// Registrations per month of `year` (current year when absent).
    async fn registration_chart(&self, year: Option<i32>) -> AppResult<Vec<MonthlyRegistrations>>;
}

pub struct DashboardManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DashboardManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardManager<U> {
    async fn stats(&self) -> AppResult<DashboardStats> {
        let reports = self.uow.reports();
        let today = Utc::now().date_naive();

        let (total_peserta, kunjungan_hari_ini, per_kategori) = tokio::try_join!(
            reports.count_participants(),
            reports.count_visits_on(today),
            reports.count_participants_by_category(),
        )?;

        let mut kategori = CategoryCounts::default();
        for (k, count) in per_kategori {
            kategori.add(k, count);
        }

        Ok(DashboardStats {
            total_peserta,
            kunjungan_hari_ini,
            kategori,
        })
    }

    async fn visit_chart(&self) -> AppResult<Vec<MonthlyVisits>> {
        let today = Utc::now().date_naive();
        let since = trailing_months(today).first().copied().unwrap_or(today);

        let rows = self.uow.reports().visits_by_month(since).await?;
        Ok(bucket_visits(today, rows))
    }

    async fn registration_chart(&self, year: Option<i32>) -> AppResult<Vec<MonthlyRegistrations>> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        let rows = self.uow.reports().registrations_by_month(year).await?;
        Ok(bucket_registrations(year, rows))
    }
}
