//! Report the cache state.

use anyhow::Result;
use larder_core::AppConfig;

pub async fn run(config: &AppConfig, json: bool) -> Result<()> {
    let worker = super::open_worker(config).await?;
    let status = worker.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("version:    {}", status.version);
    println!("cache:      {}", status.cache_name);
    match &status.controller {
        Some(name) if status.current => println!("controller: {name} (current)"),
        Some(name) => println!("controller: {name} (stale)"),
        None => println!("controller: none"),
    }
    if status.generations.is_empty() {
        println!("generations: none");
    } else {
        println!("generations:");
        for generation in &status.generations {
            println!("  {} ({} entries)", generation.name, generation.entries);
        }
    }
    Ok(())
}
