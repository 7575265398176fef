//! # Product Search Core
//!
//! Shared, WASM-safe logic for Product Search: the page model, the
//! search backend abstraction, the paging service, and an in-memory
//! backend.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! application crate supplies the Elasticsearch backend and the CLI.

pub mod backend;
pub mod error;
pub mod models;
pub mod page;
pub mod service;

pub use error::{Error, Result};
pub use page::Page;
pub use service::{PagingSearchService, SearchOptions};
