//! Dashboard aggregates and month bucketing.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::kategori::Kategori;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One count per category; every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCounts {
    pub bumil: u64,
    pub balita: u64,
    pub remaja: u64,
    pub produktif: u64,
    pub lansia: u64,
}

impl CategoryCounts {
    pub fn add(&mut self, kategori: Kategori, count: u64) {
        match kategori {
            Kategori::Bumil => self.bumil += count,
            Kategori::Balita => self.balita += count,
            Kategori::Remaja => self.remaja += count,
            Kategori::Produktif => self.produktif += count,
            Kategori::Lansia => self.lansia += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.bumil + self.balita + self.remaja + self.produktif + self.lansia
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_peserta: u64,
    pub kunjungan_hari_ini: u64,
    pub kategori: CategoryCounts,
}

/// Visits in one calendar month, split by participant category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyVisits {
    #[schema(example = "Jan 2026")]
    pub label: String,
    pub total: u64,
    #[serde(flatten)]
    pub kategori: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyRegistrations {
    #[schema(example = "Jan 2026")]
    pub label: String,
    pub total: u64,
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `"Mon YYYY"` label of a month.
pub fn month_label(month: NaiveDate) -> String {
    format!("{} {}", MONTH_ABBREVIATIONS[month.month0() as usize], month.year())
}

/// The twelve months ending with the month of `today`, oldest first.
pub fn trailing_months(today: NaiveDate) -> Vec<NaiveDate> {
    let current = month_start(today);
    (0..12u32)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// Months of `year`, January first. Empty for years chrono cannot represent.
pub fn months_of_year(year: i32) -> Vec<NaiveDate> {
    (1..=12)
        .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1))
        .collect()
}

/// Fill the trailing twelve months from `(month_start, kategori, count)` rows.
/// Rows outside the window are ignored.
pub fn bucket_visits(
    today: NaiveDate,
    rows: impl IntoIterator<Item = (NaiveDate, Kategori, u64)>,
) -> Vec<MonthlyVisits> {
    let months = trailing_months(today);
    let mut buckets: Vec<MonthlyVisits> = months
        .iter()
        .map(|month| MonthlyVisits {
            label: month_label(*month),
            total: 0,
            kategori: CategoryCounts::default(),
        })
        .collect();

    for (month, kategori, count) in rows {
        if let Some(index) = months.iter().position(|m| *m == month_start(month)) {
            buckets[index].kategori.add(kategori, count);
            buckets[index].total += count;
        }
    }
    buckets
}

/// Registrations per month of `year` from `(month_start, count)` rows.
pub fn bucket_registrations(
    year: i32,
    rows: impl IntoIterator<Item = (NaiveDate, u64)>,
) -> Vec<MonthlyRegistrations> {
    let months = months_of_year(year);
    let mut totals = vec![0u64; months.len()];
    for (month, count) in rows {
        if let Some(index) = months.iter().position(|m| *m == month_start(month)) {
            totals[index] += count;
        }
    }
    months
        .iter()
        .zip(totals)
        .map(|(month, total)| MonthlyRegistrations {
            label: month_label(*month),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trailing_window_spans_year_boundary() {
        let months = trailing_months(date(2026, 3, 31));
        assert_eq!(months.len(), 12);
        assert_eq!(months.first(), Some(&date(2025, 4, 1)));
        assert_eq!(months.last(), Some(&date(2026, 3, 1)));
        assert_eq!(month_label(months[0]), "Apr 2025");
    }

    #[test]
    fn visits_are_bucketed_by_month_and_category() {
        let chart = bucket_visits(
            date(2026, 1, 20),
            [
                (date(2026, 1, 1), Kategori::Balita, 2),
                (date(2026, 1, 1), Kategori::Lansia, 3),
                (date(2025, 12, 1), Kategori::Bumil, 1),
                (date(2024, 1, 1), Kategori::Bumil, 99),
            ],
        );
        let last = chart.last().unwrap();
        assert_eq!(last.label, "Jan 2026");
        assert_eq!(last.total, 5);
        assert_eq!(last.kategori.balita, 2);
        assert_eq!(last.kategori.lansia, 3);
        assert_eq!(chart[10].kategori.bumil, 1);
        assert_eq!(chart.iter().map(|m| m.total).sum::<u64>(), 6);
    }

    #[test]
    fn chart_rows_serialize_flat() {
        let chart = bucket_visits(date(2026, 1, 20), []);
        let json = serde_json::to_value(&chart[11]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "Jan 2026", "total": 0,
                "bumil": 0, "balita": 0, "remaja": 0, "produktif": 0, "lansia": 0
            })
        );
    }

    #[test]
    fn registrations_cover_whole_year() {
        let chart = bucket_registrations(2026, [(date(2026, 2, 1), 8), (date(2025, 2, 1), 4)]);
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[0].label, "Jan 2026");
        assert_eq!(chart[1].total, 8);
        assert_eq!(chart.iter().map(|m| m.total).sum::<u64>(), 8);
    }
}
