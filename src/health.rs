use anyhow::Result;

use crate::backend::Backend;
use crate::config::Config;

pub async fn run_health(config: &Config) -> Result<()> {
    let backend = Backend::connect(config)?;
    let health = backend.health().await?;

    println!("{:<16} {:<16} {:<8} {:<6} HEALTHY", "BACKEND", "CLUSTER", "STATUS", "NODES");
    println!(
        "{:<16} {:<16} {:<8} {:<6} {}",
        backend.name(),
        health.cluster_name,
        health.status,
        health.number_of_nodes,
        health.is_healthy()
    );

    if !health.is_healthy() {
        anyhow::bail!("cluster '{}' is {}", health.cluster_name, health.status);
    }
    Ok(())
}
