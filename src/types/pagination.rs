//! Pagination types for list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Resolved page window. Built from raw query values so each listing can
/// keep its own default page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl PaginationParams {
    /// Clamp raw values: pages start at 1, sizes at 1..=MAX_PAGE_SIZE.
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, params: PaginationParams, total: u64) -> Self {
        let total_pages = total.div_ceil(params.per_page);

        Self {
            data,
            meta: PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        }
    }

    /// Transform every row, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_are_clamped() {
        let params = PaginationParams::new(Some(0), Some(1000), 20);
        assert_eq!(params, PaginationParams { page: 1, per_page: MAX_PAGE_SIZE });
        assert_eq!(PaginationParams::new(None, None, 15).per_page, 15);
    }

    #[test]
    fn page_count_rounds_up() {
        let params = PaginationParams::new(Some(3), Some(10), 20);

        let page = Paginated::new(vec![1, 2], params, 21);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(Paginated::<u8>::new(vec![], params, 0).meta.total_pages, 0);
    }
}
