//! # Product Search
//!
//! A paged product search client for Elasticsearch-compatible engines.
//!
//! Product Search stores products in a search index and reads them back
//! one window at a time. Each [`Page`] remembers its query, offset, and
//! window size, so the next page is requested from the previous one alone:
//!
//! ```text
//! ┌──────────┐   search(q)   ┌──────────────────────┐   SearchBackend   ┌───────────────┐
//! │   CLI    │──────────────▶│ PagingSearchService  │──────────────────▶│ Elasticsearch │
//! │(psearch) │◀──────────────│  Page → next(Page)   │                   │  or in-memory │
//! └──────────┘     Page      └──────────────────────┘                   └───────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! psearch demo                          # seed 21 products in memory and walk all pages
//! psearch seed --count 100              # index sample products into the configured cluster
//! psearch search "name" --pages 2       # print the first two pages
//! psearch get 42
//! psearch health
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`backend`] | Backend selection (`memory` / `elasticsearch`) |
//! | [`elasticsearch`] | Elasticsearch REST implementation of `SearchBackend` |
//! | [`search`] | Page walking and printing (`psearch search`) |
//! | [`get`] | Product retrieval by id |
//! | [`seed`] | Sample data, single saves, and the in-process demo |
//! | [`health`] | Cluster health report |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! The paging model itself lives in `product-search-core` and is
//! re-exported here.

pub mod backend;
pub mod config;
pub mod elasticsearch;
pub mod get;
pub mod health;
pub mod logging;
pub mod search;
pub mod seed;

pub use product_search_core::backend::SearchBackend;
pub use product_search_core::models::{Document, Product};
pub use product_search_core::{Error, Page, PagingSearchService, SearchOptions};
