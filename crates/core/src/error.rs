//! Unified error types for larder.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache, the fetch client, and the worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., activating a version that was never installed).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("cache database error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("cache database error: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Network fetch failed at transport level (DNS, connect, timeout, TLS).
    #[error("network fetch failed: {0}")]
    Http(String),

    /// Fetch response exceeded the configured byte limit.
    #[error("response too large: {0}")]
    TooLarge(String),

    /// A core asset could not be fetched during the install phase.
    #[error("install failed for {path}: {reason}")]
    InstallFailed { path: String, reason: String },

    /// Network unreachable and no cached copy to fall back to.
    #[error("offline and not cached: {url}")]
    Offline { url: String },
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = Error::InvalidInput("cannot activate resilience-v29: never installed".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("resilience-v29"));
    }

    #[test]
    fn test_offline_display() {
        let err = Error::Offline { url: "https://example.com/app.js".to_string() };
        assert!(err.to_string().contains("offline"));
        assert!(err.to_string().contains("app.js"));
    }

    #[test]
    fn test_install_failed_display() {
        let err = Error::InstallFailed { path: "./styles.css".to_string(), reason: "status 404".to_string() };
        assert!(err.to_string().contains("./styles.css"));
        assert!(err.to_string().contains("status 404"));
    }
}
