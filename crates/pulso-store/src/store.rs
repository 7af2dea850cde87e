//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;
use tracing::{debug, info};

use pulso_types::{Sample, Session};

use crate::error::{Error, Result};
use crate::models::{SettingValue, StoredSession, WebhookDef};
use crate::schema;

/// SQLite-based store for monitor state.
///
/// Three collections: settings (key -> value), sessions (recorded
/// history), and webhook definitions. Opening the store lazily creates
/// the database and its schema; an open failure is fatal to every
/// persistence feature and is surfaced to the caller without retry.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Settings operations
impl Store {
    /// Write a setting, overwriting any previous value.
    pub fn set_setting(&self, key: &str, value: &SettingValue) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, encoded],
        )?;
        Ok(())
    }

    /// Read a setting.
    pub fn get_setting(&self, key: &str) -> Result<Option<SettingValue>> {
        let encoded: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match encoded {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Read a toggle setting, defaulting to `false` when unset or non-boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(self
            .get_setting(key)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

// Session operations
impl Store {
    /// Persist a closed session, returning its row id.
    ///
    /// Open sessions are rejected: only sessions with a clean end are kept.
    pub fn insert_session(&self, session: &Session) -> Result<i64> {
        let ended_at = session.ended_at.ok_or(Error::SessionNotClosed)?;
        let samples = serde_json::to_string(&session.samples)?;

        self.conn.execute(
            "INSERT INTO sessions (device, started_at, ended_at, samples)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                session.device,
                session.started_at.unix_timestamp(),
                ended_at.unix_timestamp(),
                samples,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, samples = session.samples.len(), "Persisted session");
        Ok(id)
    }

    /// List all sessions in storage order.
    pub fn list_sessions(&self) -> Result<Vec<StoredSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, device, started_at, ended_at, samples
             FROM sessions ORDER BY id",
        )?;

        let sessions = stmt
            .query_map([], map_session_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Get a session by row id.
    pub fn get_session(&self, id: i64) -> Result<Option<StoredSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, device, started_at, ended_at, samples
             FROM sessions WHERE id = ?",
        )?;

        let session = stmt.query_row([id], map_session_row).optional()?;
        Ok(session)
    }

    /// Delete sessions by id, returning how many rows were removed.
    pub fn delete_sessions(&self, ids: &[i64]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx.execute("DELETE FROM sessions WHERE id = ?", [id])?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    /// Count stored sessions.
    pub fn count_sessions(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

// Webhook operations
impl Store {
    /// Replace the whole webhook collection (clear-then-rewrite) in one
    /// transaction, assigning an id to any definition lacking one.
    ///
    /// Every definition must carry a non-empty URL.
    pub fn replace_webhooks(&self, hooks: &[WebhookDef]) -> Result<()> {
        for hook in hooks {
            if hook.url.trim().is_empty() {
                return Err(Error::InvalidWebhook(format!(
                    "webhook '{}' has an empty URL",
                    hook.name
                )));
            }
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM webhooks", [])?;

        for (position, hook) in hooks.iter().enumerate() {
            let id = if hook.id.is_empty() {
                new_webhook_id()
            } else {
                hook.id.clone()
            };
            let triggers = serde_json::to_string(&hook.triggers)?;

            tx.execute(
                "INSERT OR REPLACE INTO webhooks
                 (id, position, enabled, name, url, triggers, body, headers)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    position as i64,
                    hook.enabled,
                    hook.name,
                    hook.url,
                    triggers,
                    hook.body,
                    hook.headers,
                ],
            )?;
        }

        tx.commit()?;
        debug!(count = hooks.len(), "Rewrote webhook collection");
        Ok(())
    }

    /// List all webhook definitions in storage order.
    pub fn list_webhooks(&self) -> Result<Vec<WebhookDef>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, enabled, name, url, triggers, body, headers
             FROM webhooks ORDER BY position",
        )?;

        let hooks = stmt
            .query_map([], |row| {
                let triggers_json: String = row.get(4)?;
                let triggers = serde_json::from_str(&triggers_json)
                    .map_err(|e| json_column_error(4, e))?;
                Ok(WebhookDef {
                    id: row.get(0)?,
                    enabled: row.get(1)?,
                    name: row.get(2)?,
                    url: row.get(3)?,
                    triggers,
                    body: row.get(5)?,
                    headers: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(hooks)
    }
}

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredSession> {
    let samples_json: String = row.get(4)?;
    let samples: Vec<Sample> =
        serde_json::from_str(&samples_json).map_err(|e| json_column_error(4, e))?;

    Ok(StoredSession {
        id: row.get(0)?,
        device: row.get(1)?,
        started_at: OffsetDateTime::from_unix_timestamp(row.get(2)?).unwrap(),
        ended_at: OffsetDateTime::from_unix_timestamp(row.get(3)?).unwrap(),
        samples,
    })
}

fn json_column_error(index: usize, err: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

/// Time-based, collision-improbable webhook id: unix millis plus a short
/// random suffix.
fn new_webhook_id() -> String {
    let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    format!("{}-{:04x}", millis, rand::random::<u16>())
}
