//! Install phase: eager, all-or-nothing population of a new generation.

use larder_client::{Fetcher, resolve};
use larder_core::{Error, StoredResponse};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::manifest;
use crate::worker::Worker;

/// What a completed install stored.
#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub cache_name: String,
    pub assets: usize,
    pub bytes: u64,
    pub install_ms: u64,
}

impl<F: Fetcher + 'static> Worker<F> {
    /// Populate this version's generation with every core asset.
    ///
    /// Fetches run with bounded concurrency. Any failure, including a
    /// non-2xx status, fails the whole phase and nothing is written;
    /// the previously activated generation keeps serving. The
    /// generation itself is opened up front, so a failed install
    /// leaves it present but unpopulated.
    pub async fn install(&self) -> Result<InstallSummary, Error> {
        let start = Instant::now();
        let cache_name = self.cache_name();

        self.cache.open_generation(&cache_name).await?;

        let mut targets: Vec<(String, Url)> = Vec::with_capacity(manifest::CORE_ASSETS.len());
        for path in manifest::CORE_ASSETS {
            let url = resolve(&self.base, path)
                .map_err(|e| Error::InstallFailed { path: (*path).to_string(), reason: e.to_string() })?;
            targets.push(((*path).to_string(), url));
        }

        let semaphore = Arc::new(Semaphore::new(self.install_concurrency));
        let mut join_set = JoinSet::new();

        for (path, url) in targets {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let net = self.net.clone();

            join_set.spawn(async move {
                // NOTE: Hold permit for task duration to enforce concurrency limit
                let _permit = permit;
                let result = net.fetch(&url).await;
                (path, url, result)
            });
        }

        let mut staged: Vec<StoredResponse> = Vec::with_capacity(manifest::CORE_ASSETS.len());

        while let Some(joined) = join_set.join_next().await {
            let (path, url, result) =
                joined.map_err(|e| Error::InstallFailed { path: "task".into(), reason: e.to_string() })?;

            let response = result.map_err(|e| Error::InstallFailed { path: path.clone(), reason: e.to_string() })?;
            if !response.is_success() {
                return Err(Error::InstallFailed { path, reason: format!("status {}", response.status) });
            }

            staged.push(StoredResponse::new(
                url.as_str(),
                response.status,
                response.content_type,
                response.bytes.to_vec(),
            ));
        }

        let bytes: u64 = staged.iter().map(|r| r.body.len() as u64).sum();
        let assets = self.cache.put_entries(&cache_name, staged).await?;
        let install_ms = start.elapsed().as_millis() as u64;

        tracing::info!("installed {} assets ({} bytes) into {} in {}ms", assets, bytes, cache_name, install_ms);

        Ok(InstallSummary { cache_name, assets, bytes, install_ms })
    }
}
