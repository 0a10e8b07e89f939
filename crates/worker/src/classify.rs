//! Request classification: freshness policy and navigation inference.

use larder_core::RequestMode;
use url::Url;

/// Freshness policy for a resource class.
///
/// Stylesheets and scripts change across deployments and go stale in
/// visible ways, so they hit the network first. Everything else is
/// cache-first: pages, images, and documents rarely change and the
/// saved bandwidth matters on a weak connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Network first; fresh copies overwrite the cache, which serves as
    /// the fallback when the network is down.
    RefreshFirst,
    /// Cache first; misses go to the network and populate the cache.
    CacheFirst,
}

/// Pick the freshness policy for a URL by file extension.
///
/// Only the path is considered, so cache-busting params like
/// `styles.css?_t=123` still classify as a stylesheet.
pub fn policy_for(url: &Url) -> CachePolicy {
    match extension(url) {
        Some("css" | "js" | "mjs") => CachePolicy::RefreshFirst,
        _ => CachePolicy::CacheFirst,
    }
}

/// Guess whether a URL is a page navigation or a subresource.
///
/// Directory paths and extensionless paths read as navigations, as do
/// explicit .html/.htm documents. Callers that know the real request
/// mode should say so instead.
pub fn infer_mode(url: &Url) -> RequestMode {
    if url.path().ends_with('/') {
        return RequestMode::Navigate;
    }
    match extension(url) {
        None | Some("html" | "htm") => RequestMode::Navigate,
        Some(_) => RequestMode::Subresource,
    }
}

fn extension(url: &Url) -> Option<&str> {
    let segment = url.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() { None } else { Some(ext) }
}
