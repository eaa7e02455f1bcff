//! Offset pagination shared by list operations.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page a caller may request.
pub const MAX_LIMIT: u32 = 200;

/// Requested page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of rows, clamped to `1..=MAX_LIMIT`.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
}

impl PageRequest {
    /// Build a page request, clamping the limit into range.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total row count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows in this page.
    pub items: Vec<T>,
    /// Total rows matching the query, ignoring the window.
    pub total: u64,
    /// Limit that was applied.
    pub limit: u32,
    /// Offset that was applied.
    pub offset: u32,
}

impl<T> Page<T> {
    /// Assemble a page from rows, a total and the request that produced them.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            limit: request.limit,
            offset: request.offset,
        }
    }

    /// Transform each row, keeping the window metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let req = PageRequest::default();
        assert_eq!(req.limit, DEFAULT_LIMIT);
        assert_eq!(req.offset, 0);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(10_000), None).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(25), Some(75)).offset, 75);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], 10, PageRequest::new(Some(3), Some(3)));
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.total, 10);
        assert_eq!(mapped.limit, 3);
        assert_eq!(mapped.offset, 3);
    }
}
