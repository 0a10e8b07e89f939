//! Cache database schema migrations.
//!
//! Applied versions are tracked in a `_migrations` table so any build
//! can bring an older database file forward. A database recorded at a
//! newer version than this build understands is refused rather than
//! guessed at.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Ordered migration list: (version, SQL batch).
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_generations.sql")),
    (2, include_str!("../../migrations/002_meta.sql")),
];

/// Apply any migrations the database has not seen yet.
///
/// Each pending migration commits together with its version record, so
/// a failure partway leaves the database at the last fully applied
/// version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)?;

        let latest = MIGRATIONS.last().map_or(0, |(version, _)| *version);
        if current > latest {
            return Err(Error::MigrationFailed(format!(
                "database is at schema version {current}, newer than this build ({latest})"
            )));
        }

        for (version, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            let tx = conn.transaction().map_err(Error::from)?;
            tx.execute_batch(sql).map_err(Error::from)?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
            tx.commit().map_err(Error::from)?;
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
