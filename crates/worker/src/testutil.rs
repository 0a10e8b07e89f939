//! Scripted network doubles for exercising the worker without sockets.

use async_trait::async_trait;
use bytes::Bytes;
use larder_client::{FetchResponse, Fetcher, resolve};
use larder_core::{AppConfig, Error};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::manifest;

pub(crate) fn site_base() -> Url {
    Url::parse("http://site.test/").unwrap()
}

pub(crate) fn site_config() -> AppConfig {
    AppConfig { base_url: "http://site.test/".into(), ..Default::default() }
}

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, content_type: Option<String>, body: Vec<u8> },
    Fail(String),
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, Route>,
    calls: Vec<String>,
    offline: bool,
}

/// A stand-in for the HTTP client with scripted responses per URL.
///
/// Unrouted URLs answer 404, like a static file server would. Clones
/// share state, so a test can keep a handle for assertions after
/// handing one to the worker.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeFetcher {
    inner: Arc<Mutex<Inner>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Script a response for an exact URL, replacing any earlier route.
    pub(crate) fn route(&self, url: &str, status: u16, content_type: &str, body: &[u8]) {
        self.inner.lock().unwrap().routes.insert(
            url.to_string(),
            Route::Respond { status, content_type: Some(content_type.to_string()), body: body.to_vec() },
        );
    }

    /// Script a transport failure for an exact URL.
    pub(crate) fn fail(&self, url: &str, reason: &str) {
        self.inner.lock().unwrap().routes.insert(url.to_string(), Route::Fail(reason.to_string()));
    }

    /// Route every core asset against a base; each body echoes its path.
    pub(crate) fn route_site(&self, base: &Url) {
        for path in manifest::CORE_ASSETS {
            let url = resolve(base, path).unwrap();
            self.route(url.as_str(), 200, "text/plain", path.as_bytes());
        }
    }

    /// Take the whole network down; every fetch fails at transport level.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.inner.lock().unwrap().offline = offline;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(url.to_string());

        if inner.offline {
            return Err(Error::Http(format!("network unreachable: {url}")));
        }

        match inner.routes.get(url.as_str()) {
            Some(Route::Respond { status, content_type, body }) => Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: *status,
                content_type: content_type.clone(),
                bytes: Bytes::from(body.clone()),
                fetch_ms: 0,
            }),
            Some(Route::Fail(reason)) => Err(Error::Http(reason.clone())),
            None => Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: 404,
                content_type: Some("text/plain".to_string()),
                bytes: Bytes::from_static(b"not found"),
                fetch_ms: 0,
            }),
        }
    }
}
