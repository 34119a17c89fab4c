use serde::{Deserialize, Serialize};

use crate::error::QueryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

impl Default for LimitCfg {
    fn default() -> Self {
        Self {
            default: 10_000,
            max: 10_000,
        }
    }
}

pub fn clamp_limit(req: Option<i64>, cfg: LimitCfg) -> u64 {
    let max = cfg.max.max(1);
    match req {
        None => cfg.default.clamp(1, max),
        Some(l) if l < 1 => 1,
        Some(l) => (l as u64).min(max),
    }
}

/// Offset window of one page. `page` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Page below 1 becomes 1; limit is clamped to `[1, cfg.max]`.
    pub fn new(page: Option<i64>, limit: Option<i64>, cfg: LimitCfg) -> Self {
        Self {
            page: page.map_or(1, |p| p.max(1) as u64),
            limit: clamp_limit(limit, cfg),
        }
    }

    /// Same as [`PageWindow::new`] for raw query-string values.
    pub fn parse(page: Option<&str>, limit: Option<&str>, cfg: LimitCfg) -> Result<Self, QueryError> {
        Ok(Self::new(
            parse_int("page", page)?,
            parse_int("limit", limit)?,
            cfg,
        ))
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_int(param: &'static str, raw: Option<&str>) -> Result<Option<i64>, QueryError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| QueryError::InvalidPagination {
                param,
                value: s.to_string(),
            }),
    }
}

/// One page of results plus the size of the whole filtered set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ListPage<T> {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> ListPage<T> {
    pub fn new(window: PageWindow, total_count: u64, items: Vec<T>) -> Self {
        Self {
            page: window.page,
            limit: window.limit,
            total_count,
            items,
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Map items while keeping the paging fields (domain → DTO).
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            page: self.page,
            limit: self.limit,
            total_count: self.total_count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
