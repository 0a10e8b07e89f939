//! Activate phase: prune stale generations and claim control.

use larder_client::Fetcher;
use larder_core::Error;
use serde::Serialize;

use crate::worker::Worker;

/// What activation claimed and removed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateSummary {
    pub cache_name: String,
    pub pruned: Vec<String>,
}

impl<F: Fetcher + 'static> Worker<F> {
    /// Promote this version's generation to sole survivor and claim
    /// control of request handling immediately, without waiting for
    /// open pages to reload.
    ///
    /// Refuses to activate a version that was never installed, so the
    /// previous generation stays in force after a failed install.
    pub async fn activate(&self) -> Result<ActivateSummary, Error> {
        let cache_name = self.cache_name();

        if !self.cache.generation_exists(&cache_name).await? {
            return Err(Error::InvalidInput(format!("cannot activate {cache_name}: never installed")));
        }

        let pruned = self.cache.delete_generations_except(&cache_name).await?;
        self.cache.set_controller(&cache_name).await?;

        if pruned.is_empty() {
            tracing::info!("activated {}", cache_name);
        } else {
            tracing::info!("activated {}, pruned {}", cache_name, pruned.join(", "));
        }

        Ok(ActivateSummary { cache_name, pruned })
    }
}
