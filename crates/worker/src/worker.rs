//! Worker construction and the version update cycle.

use larder_client::Fetcher;
use larder_core::{AppConfig, CacheDb, Error};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::activate::ActivateSummary;
use crate::install::InstallSummary;
use crate::manifest;

/// The offline cache controller.
///
/// One worker instance embodies one deployed version: it installs that
/// version's cache generation, activates it, and answers requests for
/// it. Generic over the network side so outages can be scripted in
/// tests.
pub struct Worker<F: Fetcher> {
    pub(crate) cache: CacheDb,
    pub(crate) net: Arc<F>,
    pub(crate) base: Url,
    pub(crate) version: String,
    pub(crate) install_concurrency: usize,
}

/// Result of an update check.
#[derive(Debug, Clone, Serialize)]
pub enum SyncOutcome {
    /// The current version already controls the cache.
    Current { cache_name: String },
    /// A new version was installed and activated.
    Updated { install: InstallSummary, activate: ActivateSummary },
}

/// Per-generation entry count for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStatus {
    pub name: String,
    pub entries: u64,
}

/// Snapshot of cache state as seen by one worker version.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub version: String,
    pub cache_name: String,
    pub controller: Option<String>,
    pub current: bool,
    pub generations: Vec<GenerationStatus>,
}

impl<F: Fetcher + 'static> Worker<F> {
    /// Build a worker from a cache handle, a network client, and config.
    ///
    /// The version token defaults to the one baked in at build time;
    /// `config.version` overrides it.
    pub fn new(cache: CacheDb, net: F, config: &AppConfig) -> Result<Self, Error> {
        let base = config.base().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let version = config.version.clone().unwrap_or_else(|| manifest::DEPLOY_VERSION.to_string());

        Ok(Self {
            cache,
            net: Arc::new(net),
            base,
            version,
            install_concurrency: config.install_concurrency,
        })
    }

    /// The version token this worker deploys.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Name of the cache generation for this worker's version.
    pub fn cache_name(&self) -> String {
        manifest::cache_name(&self.version)
    }

    /// Absolute URL of the offline fallback page.
    pub fn entry_url(&self) -> Result<Url, Error> {
        larder_client::resolve(&self.base, manifest::ENTRY_POINT).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Run install and activation unless this version already controls
    /// the cache.
    ///
    /// The page-side updater calls this on load and again on a timer,
    /// so the common case is a cheap no-op.
    pub async fn ensure_ready(&self) -> Result<SyncOutcome, Error> {
        let cache_name = self.cache_name();

        if self.cache.controller().await?.as_deref() == Some(cache_name.as_str()) {
            return Ok(SyncOutcome::Current { cache_name });
        }

        let install = self.install().await?;
        let activate = self.activate().await?;

        Ok(SyncOutcome::Updated { install, activate })
    }

    /// Report the cache state as seen by this worker version.
    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        let cache_name = self.cache_name();
        let controller = self.cache.controller().await?;
        let current = controller.as_deref() == Some(cache_name.as_str());

        let mut generations = Vec::new();
        for name in self.cache.list_generations().await? {
            let entries = self.cache.entry_count(&name).await?;
            generations.push(GenerationStatus { name, entries });
        }

        Ok(WorkerStatus { version: self.version.clone(), cache_name, controller, current, generations })
    }

    /// Delete every generation and drop the controller claim.
    ///
    /// Returns the names removed, in creation order.
    pub async fn purge(&self) -> Result<Vec<String>, Error> {
        let names = self.cache.list_generations().await?;
        for name in &names {
            self.cache.delete_generation(name).await?;
        }
        self.cache.clear_controller().await?;

        tracing::info!("purged {} generation(s)", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeFetcher, site_base, site_config};
    use larder_core::AppConfig;

    #[tokio::test]
    async fn test_version_defaults_and_overrides() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache.clone(), FakeFetcher::new(), &site_config()).unwrap();
        assert_eq!(worker.version(), "v29");
        assert_eq!(worker.cache_name(), "resilience-v29");

        let config = AppConfig { version: Some("v30".into()), ..site_config() };
        let worker = Worker::new(cache, FakeFetcher::new(), &config).unwrap();
        assert_eq!(worker.cache_name(), "resilience-v30");
    }

    #[tokio::test]
    async fn test_ensure_ready_full_cycle() {
        let net = FakeFetcher::new();
        net.route_site(&site_base());
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache.clone(), net.clone(), &site_config()).unwrap();

        let outcome = worker.ensure_ready().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Updated { .. }));
        assert_eq!(cache.controller().await.unwrap().as_deref(), Some("resilience-v29"));

        let again = worker.ensure_ready().await.unwrap();
        assert!(matches!(again, SyncOutcome::Current { .. }));

        // The second call must not refetch anything.
        assert_eq!(net.calls().len(), crate::manifest::CORE_ASSETS.len());
    }

    #[tokio::test]
    async fn test_update_replaces_previous_version() {
        let net = FakeFetcher::new();
        net.route_site(&site_base());
        let cache = CacheDb::open_in_memory().await.unwrap();

        let old_config = AppConfig { version: Some("v28".into()), ..site_config() };
        let old = Worker::new(cache.clone(), net.clone(), &old_config).unwrap();
        old.ensure_ready().await.unwrap();

        let worker = Worker::new(cache.clone(), net.clone(), &site_config()).unwrap();
        worker.install().await.unwrap();

        // Both generations coexist until activation; the old one still controls.
        let names = cache.list_generations().await.unwrap();
        assert!(names.contains(&"resilience-v28".to_string()));
        assert!(names.contains(&"resilience-v29".to_string()));
        assert_eq!(cache.controller().await.unwrap().as_deref(), Some("resilience-v28"));

        worker.activate().await.unwrap();
        assert_eq!(cache.list_generations().await.unwrap(), vec!["resilience-v29"]);
        assert_eq!(cache.controller().await.unwrap().as_deref(), Some("resilience-v29"));
    }

    #[tokio::test]
    async fn test_status_reflects_cache_state() {
        let net = FakeFetcher::new();
        net.route_site(&site_base());
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache, net, &site_config()).unwrap();

        let status = worker.status().await.unwrap();
        assert!(!status.current);
        assert!(status.controller.is_none());
        assert!(status.generations.is_empty());

        worker.ensure_ready().await.unwrap();

        let status = worker.status().await.unwrap();
        assert!(status.current);
        assert_eq!(status.controller.as_deref(), Some("resilience-v29"));
        assert_eq!(status.generations.len(), 1);
        assert_eq!(status.generations[0].entries, crate::manifest::CORE_ASSETS.len() as u64);
    }

    #[tokio::test]
    async fn test_purge_removes_everything() {
        let net = FakeFetcher::new();
        net.route_site(&site_base());
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache.clone(), net, &site_config()).unwrap();
        worker.ensure_ready().await.unwrap();

        let removed = worker.purge().await.unwrap();
        assert_eq!(removed, vec!["resilience-v29"]);
        assert!(cache.list_generations().await.unwrap().is_empty());
        assert!(cache.controller().await.unwrap().is_none());
    }
}
