//! # Pagination and Result Envelope
//!
//! Resolves paging input to a positive `page`/`limit` pair and shapes the
//! `{ meta, result }` envelope every list endpoint returns.

use serde::{Deserialize, Serialize};

use super::params::PaginationParams;

/// First page
pub const DEFAULT_PAGE: u64 = 1;

/// Page size when the caller does not choose one
pub const DEFAULT_LIMIT: u64 = 10;

/// A resolved result window. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Resolve paging input.
    ///
    /// Absent input takes the defaults; values below 1 are raised to 1;
    /// a `limit` above `max_limit` is lowered to it.
    pub fn resolve(params: &PaginationParams, default_limit: u64, max_limit: Option<u64>) -> Self {
        let default_limit = default_limit.max(1);
        let page = params.page.map_or(DEFAULT_PAGE, at_least_one);
        let mut limit = params.limit.map_or(default_limit, at_least_one);
        if let Some(max) = max_limit {
            limit = limit.min(max.max(1));
        }
        Self { page, limit }
    }

    /// Zero-based offset of the first document in the window
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Build the metadata for a total count
    pub fn meta(&self, total: u64) -> Meta {
        Meta::new(self.page, self.limit, total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn at_least_one(n: i64) -> u64 {
    if n < 1 {
        1
    } else {
        n as u64
    }
}

/// Pagination summary returned alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_page: u64,
}

impl Meta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_page: total_pages(total, limit),
        }
    }
}

/// `ceil(total / limit)`; zero documents means zero pages
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// The `{ meta, result }` wire shape of every list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub meta: Meta,
    pub result: Vec<T>,
}

impl<T> ResultEnvelope<T> {
    pub fn new(meta: Meta, result: Vec<T>) -> Self {
        Self { meta, result }
    }
}
