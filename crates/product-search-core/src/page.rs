//! One window of search results plus the state needed to fetch the next.
//!
//! A [`Page`] is a plain immutable value. It remembers the query text,
//! the offset of its first item, and the window size it was requested
//! with, so [`PagingSearchService::next`](crate::PagingSearchService::next)
//! can continue a walk without the caller repeating the query.
//!
//! The empty page ([`Page::empty`]) is the terminal value of every walk.
//! It carries no cursor: advancing it is an error, not a restart.

use serde::Serialize;

/// Where a non-empty page sits inside the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Cursor {
    query: String,
    offset: usize,
    limit: usize,
}

/// An immutable window of ranked results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    #[serde(flatten)]
    cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Wrap one backend result window.
    ///
    /// No validation is performed; the producer guarantees
    /// `items.len() <= limit` and `limit > 0`.
    pub fn new(items: Vec<T>, query: impl Into<String>, offset: usize, limit: usize) -> Self {
        Self {
            items,
            cursor: Some(Cursor {
                query: query.into(),
                offset,
                limit,
            }),
        }
    }

    /// The terminal sentinel: no items and no cursor.
    ///
    /// Does not allocate; every call yields an equal value.
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }

    /// Results in backend rank order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The query this page was produced for. `None` on the empty page.
    pub fn query(&self) -> Option<&str> {
        self.cursor.as_ref().map(|c| c.query.as_str())
    }

    /// Zero-based position of the first item. `None` on the empty page.
    pub fn offset(&self) -> Option<usize> {
        self.cursor.as_ref().map(|c| c.offset)
    }

    /// Requested window size. `None` on the empty page.
    pub fn limit(&self) -> Option<usize> {
        self.cursor.as_ref().map(|c| c.limit)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consume the page, keeping only its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Offset the page after this one would start at. `None` on the empty
    /// page and when the sum does not fit in `usize`.
    pub(crate) fn next_offset(&self) -> Option<usize> {
        self.cursor
            .as_ref()
            .and_then(|c| c.offset.checked_add(c.limit))
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
