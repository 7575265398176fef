//! # Product Search CLI (`psearch`)
//!
//! Index, fetch, and page through products in a search index.
//!
//! ## Usage
//!
//! ```bash
//! psearch --config ./config/psearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `psearch seed` | Index sample products |
//! | `psearch search "<query>"` | Print successive result pages |
//! | `psearch get <id>` | Retrieve one product |
//! | `psearch save` | Index one product |
//! | `psearch health` | Show cluster health |
//! | `psearch demo` | Seed and walk every page in one process |
//!
//! ## Examples
//!
//! ```bash
//! # Seed 21 products, then page through them ten at a time
//! psearch seed --count 21 --reset
//! psearch search "name" --pages 3
//!
//! # Smaller pages, JSON output
//! psearch search "product" --page-size 5 --json
//! ```

use clap::{Parser, Subcommand};
use product_search::Product;
use product_search::{config, get, health, logging, search, seed};
use std::path::PathBuf;
use tracing::info;

/// Product Search CLI: a paged product search client for
/// Elasticsearch-compatible engines.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. `demo` falls back to the in-memory backend when the file is
/// missing.
#[derive(Parser)]
#[command(
    name = "psearch",
    about = "Product Search: a paged product search client",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/psearch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index sample products with ids `0..count`.
    Seed {
        /// Number of products to index.
        #[arg(long, default_value_t = 21)]
        count: usize,

        /// Drop the index before seeding.
        #[arg(long)]
        reset: bool,
    },

    /// Search products and print result pages.
    ///
    /// The first page comes from the query; each following page is
    /// requested from the previous one.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of pages to print.
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Override `[search] page_size`.
        #[arg(long)]
        page_size: Option<usize>,

        /// Print each page as one JSON object per line.
        #[arg(long)]
        json: bool,
    },

    /// Retrieve a product by id.
    Get {
        /// Product id.
        id: String,

        /// Print the product as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Index a single product.
    ///
    /// Without `--id` the backend assigns one; it is printed on success.
    Save {
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value_t = 0.0)]
        price: f64,

        #[arg(long, default_value_t = 0)]
        stock: i64,
    },

    /// Show backend health.
    Health,

    /// Seed sample products and walk every page in one process.
    Demo {
        /// Number of products to index.
        #[arg(long, default_value_t = 21)]
        count: usize,

        /// Query to page through.
        #[arg(long, default_value = "name")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.command {
        // The demo runs fine without any config file.
        Commands::Demo { .. } if !cli.config.exists() => config::Config::minimal(),
        _ => config::load_config(&cli.config)?,
    };

    logging::init_logging(&cfg.logging.level)?;
    info!(backend = %cfg.backend.kind, index = %cfg.search.index, "configuration loaded");

    match cli.command {
        Commands::Seed { count, reset } => {
            seed::run_seed(&cfg, count, reset).await?;
        }
        Commands::Search {
            query,
            pages,
            page_size,
            json,
        } => {
            search::run_search(&cfg, &query, pages, page_size, json).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, &id, json).await?;
        }
        Commands::Save {
            id,
            name,
            description,
            price,
            stock,
        } => {
            let product = Product {
                id,
                name,
                description,
                price,
                stock_available: stock,
            };
            seed::run_save(&cfg, product).await?;
        }
        Commands::Health => {
            health::run_health(&cfg).await?;
        }
        Commands::Demo { count, query } => {
            seed::run_demo(&cfg, count, &query).await?;
        }
    }

    Ok(())
}
