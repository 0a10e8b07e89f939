//! Stored response CRUD.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

const UPSERT_ENTRY: &str = "INSERT INTO entries (generation, url, status, content_type, body, fetched_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT(generation, url) DO UPDATE SET
         status = excluded.status,
         content_type = excluded.content_type,
         body = excluded.body,
         fetched_at = excluded.fetched_at";

/// A response body held in the cache, keyed by canonical URL within a
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl StoredResponse {
    /// Build a response stamped with the current time.
    pub fn new(url: impl Into<String>, status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status,
            content_type,
            body,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn row_to_response(row: &rusqlite::Row<'_>) -> Result<StoredResponse, rusqlite::Error> {
    Ok(StoredResponse {
        url: row.get(0)?,
        status: row.get(1)?,
        content_type: row.get(2)?,
        body: row.get(3)?,
        fetched_at: row.get(4)?,
    })
}

impl CacheDb {
    /// Store a response in a generation, replacing any entry for the
    /// same URL.
    ///
    /// The generation must already exist; the foreign key rejects
    /// writes into unopened generations.
    pub async fn put_entry(&self, generation: &str, response: StoredResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    UPSERT_ENTRY,
                    params![
                        generation,
                        response.url,
                        response.status,
                        response.content_type,
                        response.body,
                        response.fetched_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of responses in one transaction.
    ///
    /// Either every response lands or none do. Returns the number
    /// written.
    pub async fn put_entries(&self, generation: &str, responses: Vec<StoredResponse>) -> Result<usize, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction().map_err(Error::from)?;
                for response in &responses {
                    tx.execute(
                        UPSERT_ENTRY,
                        params![
                            generation,
                            response.url,
                            response.status,
                            response.content_type,
                            response.body,
                            response.fetched_at
                        ],
                    )?;
                }
                tx.commit().map_err(Error::from)?;
                Ok(responses.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a URL in a single generation.
    pub async fn match_in(&self, generation: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let generation = generation.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let sql = "SELECT url, status, content_type, body, fetched_at
                     FROM entries WHERE generation = ?1 AND url = ?2";
                let result = conn.query_row(sql, params![generation, url], row_to_response);

                match result {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a URL across every generation, oldest generation first.
    pub async fn match_any(&self, url: &str) -> Result<Option<StoredResponse>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let sql = "SELECT e.url, e.status, e.content_type, e.body, e.fetched_at
                     FROM entries e
                     JOIN generations g ON e.generation = g.name
                     WHERE e.url = ?1
                     ORDER BY g.created_at, g.name
                     LIMIT 1";
                let result = conn.query_row(sql, params![url], row_to_response);

                match result {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the URLs stored under a generation, sorted.
    pub async fn list_entries(&self, generation: &str) -> Result<Vec<String>, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT url FROM entries WHERE generation = ?1 ORDER BY url")?;
                let rows = stmt.query_map(params![generation], |row| row.get::<_, String>(0))?;

                let mut urls = Vec::new();
                for row in rows {
                    urls.push(row?);
                }
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
