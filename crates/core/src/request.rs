//! Request descriptions handed to the request handler.

use url::Url;

/// HTTP method of an incoming request.
///
/// Only GET requests are eligible for caching; everything else passes
/// straight to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

/// How the request reaches the site: a top-level page load or a
/// subresource referenced by one.
///
/// Navigations get the entry-page fallback when both network and cache
/// come up empty; subresources do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Subresource,
}

/// An incoming request as seen by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    /// A plain subresource GET.
    pub fn get(url: Url) -> Self {
        Self { method: Method::Get, url, mode: RequestMode::Subresource }
    }

    /// A top-level navigation GET.
    pub fn navigate(url: Url) -> Self {
        Self { method: Method::Get, url, mode: RequestMode::Navigate }
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}
