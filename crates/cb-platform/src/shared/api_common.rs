//! Common API types and utilities
//!
//! List-query options (sort, limit, page), the paginated result shape, and
//! the mapping from axum extractor rejections to validation errors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use serde::Serialize;

use super::error::PlatformError;

/// Field used when the caller gives no sort
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// MongoDB sort value (1 / -1)
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// One `field:direction` entry of a sort spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Parse `sortBy` in the form `field:desc,other:asc`.
///
/// A missing direction (or anything other than `desc`) sorts ascending.
/// Empty field names are rejected.
pub fn parse_sort_by(raw: &str) -> Result<Vec<SortSpec>, PlatformError> {
    let mut specs = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        let (field, direction) = match entry.split_once(':') {
            Some((field, dir)) if dir.trim().eq_ignore_ascii_case("desc") => (field.trim(), SortDirection::Desc),
            Some((field, _)) => (field.trim(), SortDirection::Asc),
            None => (entry, SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(PlatformError::validation(format!(
                "\"sortBy\" has an empty field name in '{}'",
                raw
            )));
        }
        specs.push(SortSpec { field: field.to_string(), direction });
    }
    Ok(specs)
}

/// Page size bounds applied to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Resolved list-query options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub sort: Vec<SortSpec>,
    pub limit: u32,
    pub page: u32,
}

impl QueryOptions {
    /// Resolve raw request values against the page limits.
    ///
    /// Non-positive or absent `limit`/`page` fall back to the defaults
    /// (limit from `limits`, page 1); `limit` is clamped to `max_limit`.
    pub fn resolve(sort: Vec<SortSpec>, limit: Option<i64>, page: Option<i64>, limits: PageLimits) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => (l.min(limits.max_limit as i64)) as u32,
            _ => limits.default_limit,
        };
        let page = match page {
            Some(p) if p > 0 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let sort = if sort.is_empty() {
            vec![SortSpec::asc(DEFAULT_SORT_FIELD)]
        } else {
            sort
        };
        Self { sort, limit, page }
    }

    /// Number of matching records skipped before this page
    pub fn skip(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * (self.limit as u64)
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::resolve(Vec::new(), None, None, PageLimits::default())
    }
}

/// One page of a list query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl<T> QueryResult<T> {
    pub fn new(results: Vec<T>, options: &QueryOptions, total_results: u64) -> Self {
        let limit = options.limit.max(1) as u64;
        let total_pages = total_results.div_ceil(limit) as u32;
        Self {
            results,
            page: options.page,
            limit: options.limit,
            total_pages,
            total_results,
        }
    }

    /// Convert the page items, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

impl From<JsonRejection> for PlatformError {
    fn from(rejection: JsonRejection) -> Self {
        PlatformError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PlatformError {
    fn from(rejection: QueryRejection) -> Self {
        PlatformError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for PlatformError {
    fn from(rejection: PathRejection) -> Self {
        PlatformError::validation(rejection.body_text())
    }
}
