//! Sample data: `psearch seed`, `psearch save`, and `psearch demo`.

use anyhow::Result;
use product_search_core::models::Product;
use tracing::info;

use crate::backend::{product_service, Backend, ProductService};
use crate::config::Config;

/// Index `count` sample products (ids `"0"..`) and refresh.
pub async fn seed_products(service: &ProductService, count: usize) -> Result<Vec<Product>> {
    let products = (0..count).map(Product::sample).collect();
    let saved = service.save_all(products).await?;
    service.refresh().await?;
    info!(count = saved.len(), index = %service.options().index, "seeded products");
    Ok(saved)
}

pub async fn run_seed(config: &Config, count: usize, reset: bool) -> Result<()> {
    let backend = Backend::connect_persistent(config, "seed")?;
    let index = &config.search.index;
    if reset {
        backend.delete_index(index).await?;
    }
    let service = product_service(&backend, config.search_options());
    let saved = seed_products(&service, count).await?;
    println!("Indexed {} products into '{}'.", saved.len(), index);
    Ok(())
}

/// Index a single product and print the id it was stored under.
pub async fn run_save(config: &Config, product: Product) -> Result<()> {
    let backend = Backend::connect_persistent(config, "save")?;
    let service = product_service(&backend, config.search_options());
    let saved = service.save(product).await?;
    service.refresh().await?;
    println!("Saved product {}", saved.id.as_deref().unwrap_or_default());
    Ok(())
}

/// Seed the configured backend and walk every page of `query` in one
/// process, printing the ids on each page.
pub async fn run_demo(config: &Config, count: usize, query: &str) -> Result<()> {
    let backend = Backend::connect(config)?;
    let index = &config.search.index;
    backend.delete_index(index).await?;

    let service = product_service(&backend, config.search_options());
    seed_products(&service, count).await?;
    println!(
        "Indexed {} products into '{}' ({} backend).",
        count,
        index,
        backend.name()
    );

    let mut walk = service.pages(query);
    let mut pages = 0;
    let mut total = 0;
    while let Some(page) = walk.next_page().await? {
        pages += 1;
        total += page.len();
        let ids: Vec<&str> = page.iter().filter_map(|p| p.id.as_deref()).collect();
        println!(
            "page {} offset={} limit={} ids={}",
            pages,
            page.offset().unwrap_or(0),
            page.limit().unwrap_or(0),
            ids.join(",")
        );
    }
    println!("exhausted after {} pages ({} products)", pages, total);
    Ok(())
}
