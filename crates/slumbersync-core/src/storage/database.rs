//! SQLite-based sleep log storage.
//!
//! Provides persistent storage for:
//! - Sleep log entries, one row per calendar date
//! - The logged-in user session
//! - Key-value store for application state

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, SessionStore, SleepStore};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::sleep::{validate_hours, NewSleepLog, SleepLogEntry};

const SESSION_KEY: &str = "session_user";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// SQLite database for sleep logs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/slumbersync/slumbersync.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("slumbersync.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened sleep database");
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sleep_logs (
                date        TEXT PRIMARY KEY,
                id          TEXT NOT NULL,
                hours       REAL NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn upsert_row(conn: &Connection, date: NaiveDate, hours: f64) -> Result<()> {
        validate_hours(hours)?;
        conn.execute(
            "INSERT INTO sleep_logs (date, id, hours, recorded_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET
                hours = excluded.hours,
                recorded_at = excluded.recorded_at",
            params![
                date.format(DATE_FORMAT).to_string(),
                uuid::Uuid::new_v4().to_string(),
                hours,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Fetch the entry for one date.
    pub fn log_on(&self, date: NaiveDate) -> Result<Option<SleepLogEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT date, id, hours, recorded_at FROM sleep_logs WHERE date = ?1",
                params![date.format(DATE_FORMAT).to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(DatabaseError::from)?;
        row.map(decode_row).transpose()
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Remove a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn decode_row(
    (date, id, hours, recorded_at): (String, String, f64, String),
) -> Result<SleepLogEntry> {
    let corrupt = |message: String| DatabaseError::CorruptRow {
        table: "sleep_logs".into(),
        message,
    };
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| corrupt(format!("date '{date}': {e}")))?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| corrupt(format!("recorded_at '{recorded_at}': {e}")))?
        .with_timezone(&Utc);
    Ok(SleepLogEntry {
        id,
        date,
        hours,
        recorded_at,
    })
}

impl SleepStore for Database {
    fn logs(&self) -> Result<Vec<SleepLogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, id, hours, recorded_at FROM sleep_logs")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(decode_row(row.map_err(DatabaseError::from)?)?);
        }
        Ok(entries)
    }

    fn upsert_log(&self, date: NaiveDate, hours: f64) -> Result<SleepLogEntry> {
        Self::upsert_row(&self.conn, date, hours)?;
        tracing::info!(%date, hours, "saved sleep log");
        self.log_on(date)?
            .ok_or_else(|| DatabaseError::QueryFailed(format!("entry for {date} vanished")).into())
    }

    fn upsert_batch(&self, entries: &[NewSleepLog]) -> Result<()> {
        for entry in entries {
            validate_hours(entry.hours)?;
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        for entry in entries {
            Self::upsert_row(&tx, entry.date, entry.hours)?;
        }
        tx.commit().map_err(DatabaseError::from)?;
        tracing::info!(count = entries.len(), "saved sleep log batch");
        Ok(())
    }
}

impl SessionStore for Database {
    fn current_user(&self) -> Result<Option<UserProfile>> {
        match self.kv_get(SESSION_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn login(&self, email: &str) -> Result<UserProfile> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail.into());
        }
        let display_name = email.split('@').next().unwrap_or(email).to_string();
        let user = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name,
        };
        self.kv_set(SESSION_KEY, &serde_json::to_string(&user)?)?;
        tracing::info!(email = %user.email, "logged in");
        Ok(user)
    }

    fn logout(&self) -> Result<()> {
        self.kv_delete(SESSION_KEY)?;
        tracing::info!("logged out");
        Ok(())
    }
}
