//! In-memory [`SearchBackend`] implementation for testing, demos, and WASM
//! targets.
//!
//! Documents live in per-index, insertion-ordered vectors behind
//! `std::sync::RwLock`. Search tokenizes the query and the searched fields
//! on non-alphanumeric boundaries (lowercased); a document matches when any
//! query token equals any field token. The score is the number of distinct
//! query tokens matched, and equal scores keep insertion order.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

use super::{BulkItem, BulkOutcome, Hit, SearchBackend, SearchHits, SearchQuery};

#[derive(Default)]
struct StoredIndex {
    docs: Vec<Hit>,
    positions: HashMap<String, usize>,
}

impl StoredIndex {
    fn upsert(&mut self, id: String, source: Value) {
        match self.positions.get(&id) {
            Some(&pos) => self.docs[pos].source = source,
            None => {
                self.positions.insert(id.clone(), self.docs.len());
                self.docs.push(Hit { id, source });
            }
        }
    }
}

/// In-memory search backend.
pub struct InMemoryBackend {
    indices: RwLock<HashMap<String, StoredIndex>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            indices: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents stored in `index`.
    pub fn doc_count(&self, index: &str) -> usize {
        let indices = self.indices.read().unwrap();
        indices.get(index).map(|i| i.docs.len()).unwrap_or(0)
    }

    /// Drop an index and all its documents. Missing indices are ignored.
    pub fn delete_index(&self, index: &str) {
        self.indices.write().unwrap().remove(index);
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn field_tokens(source: &Value, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|f| source.get(f).and_then(Value::as_str))
        .flat_map(tokenize)
        .collect()
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn get_by_id(&self, index: &str, id: &str) -> Result<Option<Hit>> {
        let indices = self.indices.read().unwrap();
        Ok(indices
            .get(index)
            .and_then(|i| i.positions.get(id).map(|&pos| i.docs[pos].clone())))
    }

    async fn search(&self, index: &str, query: &SearchQuery<'_>) -> Result<SearchHits> {
        let mut terms = tokenize(query.text);
        terms.sort();
        terms.dedup();
        if terms.is_empty() {
            return Ok(SearchHits::default());
        }

        let indices = self.indices.read().unwrap();
        let stored = match indices.get(index) {
            Some(s) => s,
            None => return Ok(SearchHits::default()),
        };

        let mut scored: Vec<(usize, &Hit)> = stored
            .docs
            .iter()
            .filter_map(|hit| {
                let tokens = field_tokens(&hit.source, query.fields);
                let matches = terms.iter().filter(|t| tokens.contains(*t)).count();
                (matches > 0).then_some((matches, hit))
            })
            .collect();
        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let total_hits = scored.len() as u64;
        let hits = scored
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, hit)| hit.clone())
            .collect();

        Ok(SearchHits { total_hits, hits })
    }

    async fn bulk_upsert(&self, index: &str, items: &[BulkItem]) -> Result<Vec<BulkOutcome>> {
        let mut indices = self.indices.write().unwrap();
        let stored = indices.entry(index.to_string()).or_default();

        let outcomes = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let id = item
                    .id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                stored.upsert(id.clone(), item.source.clone());
                BulkOutcome {
                    position,
                    id,
                    error: None,
                }
            })
            .collect();

        Ok(outcomes)
    }
}
