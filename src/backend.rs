//! Backend selection from configuration.
//!
//! Every CLI command goes through [`Backend::connect`] and
//! [`product_service`]; the `[backend] kind` setting decides whether the
//! service talks to Elasticsearch or to a process-local in-memory index.
//! Commands whose data must survive the process use
//! [`Backend::connect_persistent`], which refuses the in-memory index.

use std::sync::Arc;

use anyhow::{bail, Result};
use product_search_core::backend::memory::InMemoryBackend;
use product_search_core::backend::SearchBackend;
use product_search_core::models::Product;
use product_search_core::{PagingSearchService, SearchOptions};

use crate::config::Config;
use crate::elasticsearch::{ClusterHealth, ElasticsearchBackend};

/// The paging service specialised to products over a configured backend.
pub type ProductService = PagingSearchService<Arc<dyn SearchBackend>, Product>;

#[derive(Clone)]
pub enum Backend {
    Memory(Arc<InMemoryBackend>),
    Elasticsearch(Arc<ElasticsearchBackend>),
}

impl Backend {
    pub fn connect(config: &Config) -> Result<Self> {
        if config.is_elasticsearch() {
            Ok(Backend::Elasticsearch(Arc::new(ElasticsearchBackend::new(
                &config.backend,
            )?)))
        } else {
            Ok(Backend::Memory(Arc::new(InMemoryBackend::new())))
        }
    }

    /// Connect for a command whose effect must outlive the process.
    ///
    /// The in-memory index is dropped at exit, so `command` is refused
    /// there instead of reporting writes nobody can read back.
    pub fn connect_persistent(config: &Config, command: &str) -> Result<Self> {
        if !config.is_elasticsearch() {
            bail!(
                "`psearch {}` needs a persistent backend: the memory backend is \
                 dropped when the process exits. Set [backend] kind = \"elasticsearch\", \
                 or use `psearch demo` to try paging in memory",
                command
            );
        }
        Self::connect(config)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Elasticsearch(_) => "elasticsearch",
        }
    }

    pub fn search_backend(&self) -> Arc<dyn SearchBackend> {
        match self {
            Backend::Memory(b) => Arc::clone(b) as Arc<dyn SearchBackend>,
            Backend::Elasticsearch(b) => Arc::clone(b) as Arc<dyn SearchBackend>,
        }
    }

    /// Drop an index with everything in it.
    pub async fn delete_index(&self, index: &str) -> Result<()> {
        match self {
            Backend::Memory(b) => b.delete_index(index),
            Backend::Elasticsearch(b) => b.delete_index(index).await?,
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<ClusterHealth> {
        match self {
            Backend::Memory(_) => Ok(ClusterHealth {
                cluster_name: "in-memory".to_string(),
                status: "green".to_string(),
                number_of_nodes: 1,
            }),
            Backend::Elasticsearch(b) => Ok(b.health().await?),
        }
    }
}

/// Build a product service over `backend` with the given options.
pub fn product_service(backend: &Backend, options: SearchOptions) -> ProductService {
    PagingSearchService::new(backend.search_backend(), options)
}
