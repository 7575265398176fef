//! `psearch search`: walk the pages of a query and print them.

use anyhow::Result;
use product_search_core::models::Product;
use product_search_core::Page;
use tracing::info;

use crate::backend::{product_service, Backend};
use crate::config::Config;

/// Print up to `max_pages` pages of results for `query`.
///
/// `page_size` overrides `[search] page_size` for this run. With `json`
/// set, each page is printed as one JSON object per line.
pub async fn run_search(
    config: &Config,
    query: &str,
    max_pages: usize,
    page_size: Option<usize>,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    anyhow::ensure!(max_pages > 0, "--pages must be >= 1");
    let mut options = config.search_options();
    if let Some(size) = page_size {
        anyhow::ensure!(size > 0, "--page-size must be >= 1");
        options = options.with_page_size(size);
    }

    let backend = Backend::connect_persistent(config, "search")?;
    let service = product_service(&backend, options);

    let mut walk = service.pages(query);
    let mut shown = 0;
    while shown < max_pages {
        let page = match walk.next_page().await? {
            Some(p) => p,
            None => break,
        };
        shown += 1;
        if json {
            println!("{}", serde_json::to_string(page)?);
        } else {
            print_page(shown, page);
        }
    }

    info!(query, pages = shown, "search finished");
    if shown == 0 && !json {
        println!("No results.");
    }
    Ok(())
}

fn print_page(number: usize, page: &Page<Product>) {
    println!(
        "--- Page {} (offset {}, limit {}) ---",
        number,
        page.offset().unwrap_or(0),
        page.limit().unwrap_or(0)
    );
    let start = page.offset().unwrap_or(0);
    for (i, product) in page.iter().enumerate() {
        println!(
            "{}. [{}] {}",
            start + i + 1,
            product.id.as_deref().unwrap_or("-"),
            product.name
        );
        println!("    {}", product.description);
        println!(
            "    price: {:.2}  stock: {}",
            product.price, product.stock_available
        );
    }
    println!();
}
