mod config;
pub mod database;

pub use config::{AdviceConfig, Config, TrackingConfig};
pub use database::{Database, UserProfile};

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{ConfigError, Result};
use crate::sleep::{NewSleepLog, SleepLogEntry};

/// Returns `~/.config/slumbersync[-dev]/` based on SLUMBERSYNC_ENV.
///
/// Set SLUMBERSYNC_ENV=dev to use the development data directory.
/// SLUMBERSYNC_HOME, when set, replaces the whole path.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SLUMBERSYNC_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SLUMBERSYNC_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("slumbersync-dev")
            } else {
                base_dir.join("slumbersync")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Persistence for sleep logs.
///
/// Every write is an upsert keyed by date: an existing entry has its hours
/// replaced wholesale, otherwise a new entry is inserted. Implementations
/// must never leave two entries for one date.
pub trait SleepStore {
    /// All entries, in no guaranteed order.
    fn logs(&self) -> Result<Vec<SleepLogEntry>>;

    /// Write one day and return the stored entry.
    fn upsert_log(&self, date: NaiveDate, hours: f64) -> Result<SleepLogEntry>;

    /// Write several days. Each entry follows the same rule as
    /// [`SleepStore::upsert_log`].
    fn upsert_batch(&self, entries: &[NewSleepLog]) -> Result<()>;
}

/// Opaque login session.
pub trait SessionStore {
    fn current_user(&self) -> Result<Option<UserProfile>>;

    fn login(&self, email: &str) -> Result<UserProfile>;

    fn logout(&self) -> Result<()>;
}
