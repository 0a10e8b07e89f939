//! Install, activate, and sync subcommands.

use anyhow::Result;
use larder_client::FetchClient;
use larder_core::AppConfig;
use larder_worker::{SyncOutcome, Worker};
use std::time::Duration;

pub async fn install(config: &AppConfig) -> Result<()> {
    let worker = super::open_worker(config).await?;
    let summary = worker.install().await?;

    println!(
        "installed {} assets ({} bytes) into {} in {}ms",
        summary.assets, summary.bytes, summary.cache_name, summary.install_ms
    );
    Ok(())
}

pub async fn activate(config: &AppConfig) -> Result<()> {
    let worker = super::open_worker(config).await?;
    let summary = worker.activate().await?;

    if summary.pruned.is_empty() {
        println!("activated {}", summary.cache_name);
    } else {
        println!("activated {}, pruned {}", summary.cache_name, summary.pruned.join(", "));
    }
    Ok(())
}

/// One-shot update check, or a periodic one with `--watch`.
///
/// In watch mode a failed check is logged and the loop keeps going;
/// an unreachable network now is the whole reason to have the cache.
pub async fn sync(config: &AppConfig, watch: bool, interval_secs: u64) -> Result<()> {
    let worker = super::open_worker(config).await?;

    sync_once(&worker).await?;

    if watch {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            if let Err(e) = sync_once(&worker).await {
                tracing::warn!("sync failed: {e}");
            }
        }
    }

    Ok(())
}

async fn sync_once(worker: &Worker<FetchClient>) -> Result<()> {
    match worker.ensure_ready().await? {
        SyncOutcome::Current { cache_name } => println!("{cache_name} is current"),
        SyncOutcome::Updated { install, activate } => {
            println!(
                "updated to {} ({} assets installed, {} old generation(s) pruned)",
                activate.cache_name,
                install.assets,
                activate.pruned.len()
            );
        }
    }
    Ok(())
}
