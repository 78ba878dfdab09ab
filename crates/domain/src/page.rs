// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// A limit/offset window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    limit: u32,
    offset: u64,
}

impl Page {
    /// Creates a page.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPagination` if `limit` is zero or above
    /// [`MAX_PAGE_LIMIT`].
    pub fn new(limit: u32, offset: u64) -> Result<Self, DomainError> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::InvalidPagination {
                reason: format!("limit must be between 1 and {MAX_PAGE_LIMIT}, got {limit}"),
            });
        }
        Ok(Self { limit, offset })
    }

    /// Creates a page from optional query parameters.
    ///
    /// # Errors
    ///
    /// See [`Page::new`].
    pub fn from_query(limit: Option<u32>, offset: Option<u64>) -> Result<Self, DomainError> {
        Self::new(limit.unwrap_or(DEFAULT_PAGE_LIMIT), offset.unwrap_or(0))
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_rejected() {
        assert!(matches!(
            Page::new(0, 0),
            Err(DomainError::InvalidPagination { .. })
        ));
    }

    #[test]
    fn test_limit_above_max_rejected() {
        assert!(Page::new(MAX_PAGE_LIMIT + 1, 0).is_err());
        assert!(Page::new(MAX_PAGE_LIMIT, 0).is_ok());
    }

    #[test]
    fn test_query_defaults() {
        let page: Result<Page, DomainError> = Page::from_query(None, None);
        assert_eq!(page, Ok(Page::default()));
    }
}
