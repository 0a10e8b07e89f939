//! Cache generation operations.
//!
//! A generation is a named set of cached responses, one per deployed
//! version token. Activation keeps exactly one generation alive and
//! records it as the controller.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Open a generation by name, creating it if absent.
    ///
    /// Opening an existing generation is a no-op; its entries are kept.
    pub async fn open_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a generation exists.
    pub async fn generation_exists(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM generations WHERE name = ?1)",
                        params![name],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// List all generation names in creation order.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at, name")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all of its entries.
    ///
    /// Returns true if a generation was deleted.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every generation except the named one.
    ///
    /// Entries cascade with their generation. Returns the deleted names
    /// in creation order.
    pub async fn delete_generations_except(&self, keep: &str) -> Result<Vec<String>, Error> {
        let keep = keep.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT name FROM generations WHERE name != ?1 ORDER BY created_at, name")?;
                let rows = stmt.query_map(params![keep], |row| row.get::<_, String>(0))?;

                let mut doomed = Vec::new();
                for row in rows {
                    doomed.push(row?);
                }

                conn.execute("DELETE FROM generations WHERE name != ?1", params![keep])?;
                Ok(doomed)
            })
            .await
            .map_err(Error::from)
    }

    /// Count the entries stored under a generation.
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                        params![name],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Get the generation currently claimed as controller, if any.
    pub async fn controller(&self) -> Result<Option<String>, Error> {
        self.conn
            .call(|conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT value FROM meta WHERE key = 'controller'", [], |row| {
                    row.get::<_, String>(0)
                });

                match result {
                    Ok(name) => Ok(Some(name)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Record a generation as the controller of request handling.
    pub async fn set_controller(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('controller', ?1)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![name],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Drop the controller claim, if any.
    pub async fn clear_controller(&self) -> Result<(), Error> {
        self.conn
            .call(|conn| -> Result<(), Error> {
                conn.execute("DELETE FROM meta WHERE key = 'controller'", [])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
