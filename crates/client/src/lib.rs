//! Network client for larder.
//!
//! This crate provides the network side of the cache: a reqwest-backed
//! fetch client with byte and timeout limits, and URL helpers for turning
//! site-relative paths into canonical cache keys.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher, UrlError, canonicalize, resolve, same_origin};
