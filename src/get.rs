//! Product retrieval by id (`psearch get`).

use anyhow::{bail, Result};

use crate::backend::{product_service, Backend};
use crate::config::Config;

/// CLI entry point: fetch one product and print it to stdout.
pub async fn run_get(config: &Config, id: &str, json: bool) -> Result<()> {
    let backend = Backend::connect_persistent(config, "get")?;
    let service = product_service(&backend, config.search_options());

    let product = match service.find_by_id(id).await? {
        Some(p) => p,
        None => bail!("product not found: {}", id),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
        return Ok(());
    }

    println!("--- Product ---");
    println!("id:              {}", product.id.as_deref().unwrap_or(id));
    println!("name:            {}", product.name);
    println!("description:     {}", product.description);
    println!("price:           {:.2}", product.price);
    println!("stock_available: {}", product.stock_available);

    Ok(())
}
