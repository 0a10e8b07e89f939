//! Fetch a single resource through the cache layer.

use anyhow::{Context, Result};
use larder_client::resolve;
use larder_core::{AppConfig, Method, Request, RequestMode};
use larder_worker::{FetchOutcome, infer_mode};
use std::io::Write;
use std::path::Path;

pub async fn run(
    config: &AppConfig,
    target: &str,
    mode: Option<RequestMode>,
    output: Option<&Path>,
) -> Result<()> {
    let worker = super::open_worker(config).await?;
    let base = config.base()?;
    let url = resolve(&base, target).with_context(|| format!("cannot resolve '{target}'"))?;
    let mode = mode.unwrap_or_else(|| infer_mode(&url));

    let request = Request { method: Method::Get, url, mode };
    let outcome = worker.handle(&request).await?;

    let FetchOutcome::Served(served) = outcome else {
        anyhow::bail!("request was not intercepted");
    };

    tracing::info!(
        status = served.status,
        url = %served.url,
        source = ?served.source,
        bytes = served.body.len(),
        "served"
    );

    match output {
        Some(path) => {
            std::fs::write(path, &served.body)
                .with_context(|| format!("cannot write {}", path.display()))?;
        }
        None => std::io::stdout().write_all(&served.body)?,
    }
    Ok(())
}
