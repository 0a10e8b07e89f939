//! Subcommand implementations.

pub mod get;
pub mod lifecycle;
pub mod purge;
pub mod status;

use anyhow::Result;
use larder_client::{FetchClient, FetchConfig};
use larder_core::{AppConfig, CacheDb};
use larder_worker::Worker;

/// Open the cache database and build a worker over the real network
/// client. Creates the database's parent directory if needed.
pub(crate) async fn open_worker(config: &AppConfig) -> Result<Worker<FetchClient>> {
    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let cache = CacheDb::open(&config.db_path).await?;
    let net = FetchClient::new(FetchConfig::from(config))?;

    Ok(Worker::new(cache, net, config)?)
}
