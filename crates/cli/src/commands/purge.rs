//! Drop every cached generation.

use anyhow::Result;
use larder_core::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let worker = super::open_worker(config).await?;
    let purged = worker.purge().await?;

    if purged.is_empty() {
        println!("nothing to purge");
    } else {
        println!("purged {}", purged.join(", "));
    }
    Ok(())
}
