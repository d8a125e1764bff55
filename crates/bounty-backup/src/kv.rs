//! A small hash/set key-value store on top of SQLite.
//!
//! Commands are queued into a [`Batch`] and applied by [`KvStore::exec`] in a
//! single transaction: either every command lands or none does. Each command
//! yields one integer reply, counting what it newly added.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, Transaction, params};
use tracing::info;

use crate::BackupError;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set fields of the hash at `key`, creating it if needed.
    HSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Add members to the set at `key`.
    SAdd { key: String, members: Vec<String> },
}

#[derive(Debug, Default)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hset<K, F, V>(&mut self, key: K, fields: impl IntoIterator<Item = (F, V)>) -> &mut Self
    where
        K: Into<String>,
        F: Into<String>,
        V: Into<String>,
    {
        self.commands.push(Command::HSet {
            key: key.into(),
            fields: fields
                .into_iter()
                .map(|(f, v)| (f.into(), v.into()))
                .collect(),
        });
        self
    }

    pub fn sadd(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::SAdd {
            key: key.into(),
            members: vec![member.into()],
        });
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self, BackupError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv_hashes (
                key     TEXT NOT NULL,
                field   TEXT NOT NULL,
                value   TEXT NOT NULL,
                PRIMARY KEY (key, field)
            );

            CREATE TABLE IF NOT EXISTS kv_sets (
                key     TEXT NOT NULL,
                member  TEXT NOT NULL,
                PRIMARY KEY (key, member)
            );
            ",
        )?;

        info!("Backup store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T, BackupError>
    where
        F: FnOnce(&mut Connection) -> Result<T, BackupError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| BackupError::Unavailable(format!("backup lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    /// Apply every queued command atomically. Returns one reply per command.
    pub fn exec(&self, batch: Batch) -> Result<Vec<i64>, BackupError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut replies = Vec::with_capacity(batch.commands.len());

            for command in &batch.commands {
                let reply = match command {
                    Command::HSet { key, fields } => hset(&tx, key, fields)?,
                    Command::SAdd { key, members } => sadd(&tx, key, members)?,
                };
                replies.push(reply);
            }

            tx.commit()?;
            Ok(replies)
        })
    }

    pub fn hash_get_all(&self, key: &str) -> Result<BTreeMap<String, String>, BackupError> {
        self.with_conn_mut(|conn| {
            let mut stmt = conn.prepare("SELECT field, value FROM kv_hashes WHERE key = ?1")?;
            let fields = stmt
                .query_map([key], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<BTreeMap<_, _>, _>>()?;
            Ok(fields)
        })
    }

    pub fn set_members(&self, key: &str) -> Result<Vec<String>, BackupError> {
        self.with_conn_mut(|conn| {
            let mut stmt =
                conn.prepare("SELECT member FROM kv_sets WHERE key = ?1 ORDER BY member")?;
            let members = stmt
                .query_map([key], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(members)
        })
    }
}

fn hset(tx: &Transaction<'_>, key: &str, fields: &[(String, String)]) -> Result<i64, BackupError> {
    let mut added = 0;
    for (field, value) in fields {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM kv_hashes WHERE key = ?1 AND field = ?2)",
            params![key, field],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO kv_hashes (key, field, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
            params![key, field, value],
        )?;
        if !exists {
            added += 1;
        }
    }
    Ok(added)
}

fn sadd(tx: &Transaction<'_>, key: &str, members: &[String]) -> Result<i64, BackupError> {
    let mut added = 0;
    for member in members {
        added += tx.execute(
            "INSERT OR IGNORE INTO kv_sets (key, member) VALUES (?1, ?2)",
            params![key, member],
        )? as i64;
    }
    Ok(added)
}
