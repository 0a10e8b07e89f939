//! Offline cache controller for a static site.
//!
//! The worker keeps a site usable without a network connection. Each
//! deployed version eagerly caches a fixed manifest of core assets into
//! its own generation (install), retires older generations wholesale
//! and claims control (activate), then answers individual requests from
//! cache or network according to a per-resource freshness policy
//! (handle).

pub mod activate;
pub mod classify;
pub mod handler;
pub mod install;
pub mod manifest;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

pub use activate::ActivateSummary;
pub use classify::{CachePolicy, infer_mode, policy_for};
pub use handler::{FetchOutcome, ServeSource, Served};
pub use install::InstallSummary;
pub use worker::{GenerationStatus, SyncOutcome, Worker, WorkerStatus};
