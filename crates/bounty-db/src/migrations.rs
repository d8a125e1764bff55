use rusqlite::Connection;
use tracing::info;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (bounties, submissions)");
        conn.execute_batch(
            "
            CREATE TABLE bounties (
                id          TEXT PRIMARY KEY,
                creator     TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                amount      REAL NOT NULL CHECK (amount >= 0),
                status      TEXT NOT NULL DEFAULT 'open'
                            CHECK (status IN ('open', 'complete')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE submissions (
                id          INTEGER NOT NULL,
                bounty_id   TEXT NOT NULL REFERENCES bounties(id),
                hunter      TEXT NOT NULL,
                is_complete INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (bounty_id, id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
