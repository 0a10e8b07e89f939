//! SQLite-backed cache of versioned generations.
//!
//! This module provides the persistent cache the worker reads and writes,
//! using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named cache generations, one per deployed version token
//! - URL-keyed response entries with upsert semantics
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Generation-wide deletes for activation-time eviction

pub mod connection;
pub mod entries;
pub mod generations;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
