//! Fetch interception: the per-request serve path.
//!
//! Every GET is answered from cache or network according to the
//! freshness policy of its resource class; anything else passes
//! through untouched. Cache lookups search all generations, oldest
//! first, while writes always land in the current version's
//! generation.

use bytes::Bytes;
use larder_client::{FetchResponse, Fetcher, same_origin};
use larder_core::{Error, Request, RequestMode, StoredResponse};
use url::Url;

use crate::classify::{self, CachePolicy};
use crate::worker::Worker;

/// How the handler disposed of a request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the caller talks to the network itself.
    Bypass,
    /// Intercepted and answered.
    Served(Served),
}

/// A response produced by the handler.
#[derive(Debug, Clone)]
pub struct Served {
    /// URL the body belongs to. Differs from the requested URL when the
    /// entry page is substituted for a failed navigation.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub source: ServeSource,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    Network,
    Cache,
    /// Cached entry page substituted for a failed navigation.
    Fallback,
}

impl<F: Fetcher + 'static> Worker<F> {
    /// Handle one request.
    ///
    /// Non-GET methods are never intercepted.
    pub async fn handle(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if !request.method.is_get() {
            return Ok(FetchOutcome::Bypass);
        }

        let mut url = request.url.clone();
        url.set_fragment(None);

        let served = match classify::policy_for(&url) {
            CachePolicy::RefreshFirst => self.refresh_first(&url).await?,
            CachePolicy::CacheFirst => self.cache_first(&url, request.mode).await?,
        };

        Ok(FetchOutcome::Served(served))
    }

    /// Network first; fresh 2xx copies overwrite the cache, and the
    /// cache serves as the fallback when the network is down.
    async fn refresh_first(&self, url: &Url) -> Result<Served, Error> {
        match self.net.fetch(url).await {
            Ok(response) => {
                if response.is_success() {
                    self.store_copy(&self.cache_name(), url, &response).await;
                }
                Ok(from_network(url, response))
            }
            Err(e) => {
                tracing::debug!("network failed for {}: {}, trying cache", url, e);
                match self.cache.match_any(url.as_str()).await? {
                    Some(stored) => Ok(from_cache(url, stored)),
                    None => Err(Error::Offline { url: url.to_string() }),
                }
            }
        }
    }

    /// Cache first; misses go to the network, and successful
    /// same-origin responses are stored opportunistically. Navigations
    /// that fail entirely fall back to the cached entry page.
    async fn cache_first(&self, url: &Url, mode: RequestMode) -> Result<Served, Error> {
        if let Some(stored) = self.cache.match_any(url.as_str()).await? {
            return Ok(from_cache(url, stored));
        }

        match self.net.fetch(url).await {
            Ok(response) => {
                if response.is_success() && same_origin(url, &self.base) {
                    self.store_copy(&self.cache_name(), url, &response).await;
                }
                Ok(from_network(url, response))
            }
            Err(e) => {
                if mode == RequestMode::Navigate {
                    let entry = self.entry_url()?;
                    if let Some(stored) = self.cache.match_any(entry.as_str()).await? {
                        tracing::debug!("network failed for {}: {}, serving entry page", url, e);
                        let mut served = from_cache(&entry, stored);
                        served.source = ServeSource::Fallback;
                        return Ok(served);
                    }
                    return Err(Error::Offline { url: url.to_string() });
                }
                Err(e)
            }
        }
    }

    /// Best-effort cache write. Failures are logged and swallowed so
    /// the response already in hand still reaches the caller.
    async fn store_copy(&self, cache_name: &str, url: &Url, response: &FetchResponse) {
        let stored = StoredResponse::new(
            url.as_str(),
            response.status,
            response.content_type.clone(),
            response.bytes.to_vec(),
        );

        let result = async {
            self.cache.open_generation(cache_name).await?;
            self.cache.put_entry(cache_name, stored).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!("cache write failed for {}: {}", url, e);
        }
    }
}

fn from_network(url: &Url, response: FetchResponse) -> Served {
    Served {
        url: url.clone(),
        status: response.status,
        content_type: response.content_type,
        body: response.bytes,
        source: ServeSource::Network,
    }
}

fn from_cache(url: &Url, stored: StoredResponse) -> Served {
    Served {
        url: url.clone(),
        status: stored.status,
        content_type: stored.content_type,
        body: Bytes::from(stored.body),
        source: ServeSource::Cache,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeFetcher, site_base, site_config};
    use larder_core::{CacheDb, Method};

    fn url(path: &str) -> Url {
        larder_client::resolve(&site_base(), path).unwrap()
    }

    async fn installed_worker(net: &FakeFetcher) -> (Worker<FakeFetcher>, CacheDb) {
        net.route_site(&site_base());
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache.clone(), net.clone(), &site_config()).unwrap();
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        (worker, cache)
    }

    fn served(outcome: FetchOutcome) -> Served {
        match outcome {
            FetchOutcome::Served(served) => served,
            FetchOutcome::Bypass => panic!("expected a served response"),
        }
    }

    #[tokio::test]
    async fn test_non_get_is_never_intercepted() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        let calls_before = net.calls().len();

        let request = Request { method: Method::Post, url: url("./index.html"), mode: RequestMode::Subresource };
        let outcome = worker.handle(&request).await.unwrap();

        assert!(matches!(outcome, FetchOutcome::Bypass));
        assert_eq!(net.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_stylesheet_refreshes_over_network() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let styles = url("./styles.css");
        net.route(styles.as_str(), 200, "text/css", b"body { color: peru }");

        let outcome = worker.handle(&Request::get(styles.clone())).await.unwrap();
        let served = served(outcome);

        assert_eq!(served.source, ServeSource::Network);
        assert_eq!(served.body.as_ref(), b"body { color: peru }");

        // The fresh copy overwrote what install stored.
        let stored = cache.match_any(styles.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.body, b"body { color: peru }");
    }

    #[tokio::test]
    async fn test_image_is_cache_first() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        let favicon = url("./assets/favicon.svg");
        let calls_before = net.call_count(favicon.as_str());

        let outcome = worker.handle(&Request::get(favicon.clone())).await.unwrap();
        let served = served(outcome);

        assert_eq!(served.source, ServeSource::Cache);
        assert_eq!(served.body.as_ref(), b"./assets/favicon.svg");
        assert_eq!(net.call_count(favicon.as_str()), calls_before);
    }

    #[tokio::test]
    async fn test_navigation_falls_back_to_entry_page() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        net.set_offline(true);

        let request = Request::navigate(url("./water-purification.html"));
        let served = served(worker.handle(&request).await.unwrap());

        assert_eq!(served.source, ServeSource::Fallback);
        assert_eq!(served.url.path(), "/index.html");
        assert_eq!(served.body.as_ref(), b"./index.html");
    }

    #[tokio::test]
    async fn test_navigation_double_miss_is_offline_error() {
        let net = FakeFetcher::new();
        net.set_offline(true);
        let cache = CacheDb::open_in_memory().await.unwrap();
        let worker = Worker::new(cache, net, &site_config()).unwrap();

        let request = Request::navigate(url("./egypt.html"));
        let result = worker.handle(&request).await;

        assert!(matches!(result, Err(Error::Offline { .. })));
    }

    #[tokio::test]
    async fn test_subresource_miss_propagates_failure() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        net.set_offline(true);

        let request = Request::get(url("./assets/photos/dune.jpg"));
        let result = worker.handle(&request).await;

        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_refresh_first_serves_cache_when_offline() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        net.set_offline(true);

        let served = served(worker.handle(&Request::get(url("./styles.css"))).await.unwrap());

        assert_eq!(served.source, ServeSource::Cache);
        assert_eq!(served.body.as_ref(), b"./styles.css");
    }

    #[tokio::test]
    async fn test_refresh_first_double_miss_is_offline_error() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;
        net.set_offline(true);

        let result = worker.handle(&Request::get(url("./assets/js/new-widget.js"))).await;

        assert!(matches!(result, Err(Error::Offline { .. })));
    }

    #[tokio::test]
    async fn test_runtime_cache_stores_same_origin_pages() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let page = url("./checklist.html");
        net.route(page.as_str(), 200, "text/html", b"<ol>pack water</ol>");

        let first = served(worker.handle(&Request::navigate(page.clone())).await.unwrap());
        assert_eq!(first.source, ServeSource::Network);
        assert!(cache.match_any(page.as_str()).await.unwrap().is_some());

        net.set_offline(true);
        let second = served(worker.handle(&Request::navigate(page)).await.unwrap());
        assert_eq!(second.source, ServeSource::Cache);
        assert_eq!(second.body.as_ref(), b"<ol>pack water</ol>");
    }

    #[tokio::test]
    async fn test_runtime_cache_skips_cross_origin() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let remote = Url::parse("http://tiles.other.test/map-layer.png").unwrap();
        net.route(remote.as_str(), 200, "image/png", b"pixels");

        let served = served(worker.handle(&Request::get(remote.clone())).await.unwrap());

        assert_eq!(served.source, ServeSource::Network);
        assert!(cache.match_any(remote.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_first_stores_cross_origin() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let remote = Url::parse("http://cdn.other.test/leaflet.js").unwrap();
        net.route(remote.as_str(), 200, "text/javascript", b"var L = {}");

        let served = served(worker.handle(&Request::get(remote.clone())).await.unwrap());
        assert_eq!(served.source, ServeSource::Network);

        // Scripts refresh in place wherever they come from; only the
        // cache-first path gates writes on origin.
        let stored = cache.match_any(remote.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.body, b"var L = {}");
    }

    #[tokio::test]
    async fn test_runtime_cache_skips_error_responses() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let missing = url("./retired-page.html");

        let served = served(worker.handle(&Request::navigate(missing.clone())).await.unwrap());

        // The 404 reaches the caller but never lands in the cache.
        assert_eq!(served.status, 404);
        assert_eq!(served.source, ServeSource::Network);
        assert!(cache.match_any(missing.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_serves() {
        let net = FakeFetcher::new();
        let (worker, cache) = installed_worker(&net).await;
        let styles = url("./styles.css");
        net.route(styles.as_str(), 200, "text/css", b"body { color: sienna }");

        // Break the store underneath the worker. The refresh fetch
        // still succeeds, so the body must reach the caller even
        // though the write-back fails.
        cache.close().await.unwrap();

        let served = served(worker.handle(&Request::get(styles)).await.unwrap());

        assert_eq!(served.source, ServeSource::Network);
        assert_eq!(served.body.as_ref(), b"body { color: sienna }");
    }

    #[tokio::test]
    async fn test_fragment_stripped_for_lookup() {
        let net = FakeFetcher::new();
        let (worker, _cache) = installed_worker(&net).await;

        let with_fragment = Url::parse("http://site.test/navigation.html#compass").unwrap();
        let served = served(worker.handle(&Request::navigate(with_fragment)).await.unwrap());

        assert_eq!(served.source, ServeSource::Cache);
        assert_eq!(served.body.as_ref(), b"./navigation.html");
    }
}
