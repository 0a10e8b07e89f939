//! Core types and shared functionality for larder.
//!
//! This crate provides:
//! - Versioned cache storage with SQLite backend
//! - The request model shared by the worker and the CLI
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheDb, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use request::{Method, Request, RequestMode};
