//! Paging search service: document CRUD and forward-only offset paging.
//!
//! The service owns no cursor state. Every [`Page`] it returns carries the
//! query text, offset, and window size, and [`PagingSearchService::next`]
//! derives the following window from those alone:
//!
//! ```text
//! search(q)  ──▶ backend.search(q, offset = 0,              limit = page_size)
//! next(page) ──▶ backend.search(page.query, offset = page.offset + page.limit,
//!                                           limit  = page.limit)
//! ```
//!
//! A window with no hits (or a zero total) yields [`Page::empty`], which
//! ends the walk. Backend failures are returned unchanged.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::backend::{BulkItem, Hit, SearchBackend, SearchQuery};
use crate::error::{Error, Result};
use crate::models::Document;
use crate::page::Page;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fields searched when none are configured.
pub const DEFAULT_FIELDS: [&str; 2] = ["name", "description"];

/// Index name and retrieval parameters for a [`PagingSearchService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Index all operations target.
    pub index: String,
    /// Document fields the query text is matched against.
    pub fields: Vec<String>,
    /// Window size of the first page. Must be greater than zero.
    pub page_size: usize,
}

impl SearchOptions {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Turns queries into [`Page`]s and pages into their successors.
pub struct PagingSearchService<B, T> {
    backend: B,
    options: SearchOptions,
    _doc: PhantomData<fn() -> T>,
}

impl<B, T> PagingSearchService<B, T>
where
    B: SearchBackend,
    T: Document + Serialize + DeserializeOwned,
{
    pub fn new(backend: B, options: SearchOptions) -> Self {
        Self {
            backend,
            options,
            _doc: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Fetch a single document. `Ok(None)` when the id is unknown.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        debug!(index = %self.options.index, id, "get by id");
        match self.backend.get_by_id(&self.options.index, id).await? {
            Some(hit) => Ok(Some(into_document(hit)?)),
            None => Ok(None),
        }
    }

    /// First page of results for `query`.
    pub async fn search(&self, query: &str) -> Result<Page<T>> {
        self.fetch_page(query, 0, self.options.page_size).await
    }

    /// The page following `page`, with the same query and window size.
    ///
    /// Fails with [`Error::InvalidState`] on the empty page, which has no
    /// query or offset to continue from, and when the next offset would
    /// overflow.
    pub async fn next(&self, page: &Page<T>) -> Result<Page<T>> {
        let (query, limit) = match (page.query(), page.limit()) {
            (Some(q), Some(l)) => (q, l),
            _ => {
                return Err(Error::InvalidState(
                    "cannot advance past the empty page".to_string(),
                ))
            }
        };
        let offset = page.next_offset().ok_or_else(|| {
            Error::InvalidState(format!(
                "offset {} + limit {} overflows",
                page.offset().unwrap_or_default(),
                limit
            ))
        })?;
        self.fetch_page(query, offset, limit).await
    }

    /// Forward-only walk over every non-empty page for `query`.
    pub fn pages(&self, query: impl Into<String>) -> PageWalk<'_, B, T> {
        PageWalk {
            service: self,
            query: query.into(),
            current: None,
            done: false,
        }
    }

    /// Index one document and return it with its assigned id.
    pub async fn save(&self, item: T) -> Result<T> {
        let mut saved = self.save_all(vec![item]).await?;
        saved.pop().ok_or(Error::BulkMismatch {
            expected: 1,
            actual: 0,
        })
    }

    /// Index a batch of documents and return them with their assigned ids.
    ///
    /// The backend's i-th outcome is applied to the i-th input. Outcomes
    /// that are missing, out of position, rejected, or that echo a
    /// different id than the one supplied fail the whole call and no ids
    /// are assigned.
    pub async fn save_all(&self, mut items: Vec<T>) -> Result<Vec<T>> {
        if items.is_empty() {
            return Ok(items);
        }

        let batch = items
            .iter()
            .map(|item| -> Result<BulkItem> {
                Ok(BulkItem {
                    id: item.id().map(str::to_string),
                    source: serde_json::to_value(item)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(index = %self.options.index, count = batch.len(), "bulk upsert");
        let outcomes = self.backend.bulk_upsert(&self.options.index, &batch).await?;

        if outcomes.len() != items.len() {
            return Err(Error::BulkMismatch {
                expected: items.len(),
                actual: outcomes.len(),
            });
        }
        for (i, outcome) in outcomes.iter().enumerate() {
            if outcome.position != i {
                return Err(Error::BulkOutOfOrder {
                    position: i,
                    reported: outcome.position,
                });
            }
            if let Some(reason) = &outcome.error {
                return Err(Error::BulkItemFailed {
                    position: i,
                    reason: reason.clone(),
                });
            }
            if let Some(expected) = &batch[i].id {
                if *expected != outcome.id {
                    return Err(Error::BulkIdMismatch {
                        position: i,
                        expected: expected.clone(),
                        reported: outcome.id.clone(),
                    });
                }
            }
        }

        for (item, outcome) in items.iter_mut().zip(outcomes) {
            item.set_id(outcome.id);
        }
        Ok(items)
    }

    /// Make prior saves visible to [`search`](Self::search).
    pub async fn refresh(&self) -> Result<()> {
        self.backend.refresh(&self.options.index).await
    }

    async fn fetch_page(&self, query: &str, offset: usize, limit: usize) -> Result<Page<T>> {
        debug!(index = %self.options.index, query, offset, limit, "search window");
        let request = SearchQuery {
            text: query,
            fields: &self.options.fields,
            offset,
            limit,
        };
        let result = self.backend.search(&self.options.index, &request).await?;

        if result.total_hits == 0 || result.hits.is_empty() {
            debug!(query, offset, "result set exhausted");
            return Ok(Page::empty());
        }

        let items = result
            .hits
            .into_iter()
            .map(into_document)
            .collect::<Result<Vec<T>>>()?;
        Ok(Page::new(items, query, offset, limit))
    }
}

fn into_document<T: Document + DeserializeOwned>(hit: Hit) -> Result<T> {
    let mut doc: T = serde_json::from_value(hit.source)?;
    doc.set_id(hit.id);
    Ok(doc)
}

/// Successive pages of one query, produced by [`PagingSearchService::pages`].
pub struct PageWalk<'a, B, T> {
    service: &'a PagingSearchService<B, T>,
    query: String,
    current: Option<Page<T>>,
    done: bool,
}

impl<B, T> PageWalk<'_, B, T>
where
    B: SearchBackend,
    T: Document + Serialize + DeserializeOwned,
{
    /// Fetch the next non-empty page, or `None` once the results run out.
    pub async fn next_page(&mut self) -> Result<Option<&Page<T>>> {
        if self.done {
            return Ok(None);
        }

        let page = match self.current.as_ref() {
            None => self.service.search(&self.query).await?,
            Some(prev) => self.service.next(prev).await?,
        };

        if page.is_empty() {
            self.done = true;
            self.current = None;
            return Ok(None);
        }

        self.current = Some(page);
        Ok(self.current.as_ref())
    }
}
