//! Page/limit resolution for listings.
//!
//! Callers pass whatever the transport gave them; anything missing or out of
//! range falls back to the defaults rather than failing the request.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

/// A resolved page: 1-based `page`, `limit` in `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    page: i64,
    limit: i64,
}

impl Page {
    /// Resolves caller-supplied bounds.
    ///
    /// - `page` missing or `< 1` → [`DEFAULT_PAGE`]
    /// - `limit` missing or outside `1..=MAX_LIMIT` → [`DEFAULT_LIMIT`]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        Page { page, limit }
    }

    #[inline]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip before this page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}
