//! Search backend abstraction for Product Search.
//!
//! The [`SearchBackend`] trait is the only boundary of the paging service:
//! get-by-id, windowed search, and bulk upsert over JSON documents. The
//! query DSL, bulk wire format, and transport all live behind it.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// One document returned by the backend, with its engine-side id.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub source: Value,
}

/// A single windowed retrieval.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    /// Free-text query, passed to the engine unchanged.
    pub text: &'a str,
    /// Document fields the text is matched against.
    pub fields: &'a [String],
    /// Zero-based position of the first hit to return.
    pub offset: usize,
    /// Maximum number of hits to return.
    pub limit: usize,
}

/// Result of a [`SearchBackend::search`] call.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    /// Number of documents matching the query across all windows.
    pub total_hits: u64,
    /// The requested window, in rank order. Never longer than the limit.
    pub hits: Vec<Hit>,
}

/// One document in a bulk upsert.
#[derive(Debug, Clone)]
pub struct BulkItem {
    /// Caller-chosen id; the backend assigns one when `None`.
    pub id: Option<String>,
    pub source: Value,
}

/// Outcome of one [`BulkItem`], aligned with the request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    /// Index of the corresponding item in the submitted batch. Engines that
    /// answer in request order without echoing positions (Elasticsearch)
    /// report the slot index; the service then cross-checks supplied ids.
    pub position: usize,
    /// Id the document was stored under.
    pub id: String,
    /// Per-item rejection reason reported by the engine.
    pub error: Option<String>,
}

/// Abstract document-search engine.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_by_id`](SearchBackend::get_by_id) | Fetch one document |
/// | [`search`](SearchBackend::search) | Ranked, windowed full-text search |
/// | [`bulk_upsert`](SearchBackend::bulk_upsert) | Index a batch of documents |
/// | [`refresh`](SearchBackend::refresh) | Make recent writes searchable |
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Retrieve a document by id. `Ok(None)` when it does not exist.
    async fn get_by_id(&self, index: &str, id: &str) -> Result<Option<Hit>>;

    /// Run a windowed search.
    async fn search(&self, index: &str, query: &SearchQuery<'_>) -> Result<SearchHits>;

    /// Insert or replace documents.
    ///
    /// Returns one outcome per item, in submission order.
    async fn bulk_upsert(&self, index: &str, items: &[BulkItem]) -> Result<Vec<BulkOutcome>>;

    /// Make all prior writes to `index` visible to search.
    async fn refresh(&self, _index: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<B: SearchBackend + ?Sized> SearchBackend for Arc<B> {
    async fn get_by_id(&self, index: &str, id: &str) -> Result<Option<Hit>> {
        (**self).get_by_id(index, id).await
    }

    async fn search(&self, index: &str, query: &SearchQuery<'_>) -> Result<SearchHits> {
        (**self).search(index, query).await
    }

    async fn bulk_upsert(&self, index: &str, items: &[BulkItem]) -> Result<Vec<BulkOutcome>> {
        (**self).bulk_upsert(index, items).await
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        (**self).refresh(index).await
    }
}
