//! SQLite connection setup for the cache database.
//!
//! One database file holds every cache generation. WAL mode plus a
//! busy timeout keep concurrent invocations from tripping over each
//! other, since a long-lived `sync --watch` process and one-shot
//! commands routinely share the file.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Handle to the cache database.
///
/// Clones are cheap and share one connection serviced on a background
/// thread.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open the cache database at `path`, creating the file if needed,
    /// and run any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open a throwaway in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA busy_timeout=5000;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Close the underlying connection.
    ///
    /// Any remaining clone fails on its next call. Tests lean on this
    /// to simulate a broken cache store.
    pub async fn close(self) -> Result<(), Error> {
        self.conn.close().await.map_err(|e| Error::Database(e.into()))
    }
}
