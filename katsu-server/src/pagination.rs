//! Pagination utilities for list endpoints
//!
//! Callers pick a page with `page` (1-indexed) and `page_size`; the default
//! page size is 100 and the maximum is 1000.

use serde::{Deserialize, Serialize};

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: i64 = 100;
/// Upper bound on caller-requested page size
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Query parameters shared by all paginated endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Rows per page, clamped to [1, MAX_PAGE_SIZE]
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed, clamped to valid range)
    pub page: i64,
    /// Sanitized rows per page
    pub page_size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and the raw query.
///
/// Out-of-bounds page numbers are clamped into [1, total_pages].
pub fn calculate_pagination(total_results: i64, query: PageQuery) -> Pagination {
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = query.page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}

/// Envelope for paginated list responses
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub items: Vec<T>,
}
