pub mod advice;
pub mod auth;
pub mod config;
pub mod key;
pub mod log;
pub mod stats;

use slumbersync_core::{Config, CoreError, Database, SessionStore, Tracker, UserProfile};

/// Open the database and make sure someone is logged in.
pub fn open_session() -> Result<(Database, UserProfile), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user = db.current_user()?.ok_or(CoreError::NotLoggedIn)?;
    Ok((db, user))
}

/// Tracker for the logged-in user, using the configured target.
pub fn open_tracker() -> Result<(Tracker<Database>, UserProfile), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let (db, user) = open_session()?;
    tracing::debug!(
        target_hours = config.tracking.target_hours,
        user = %user.email,
        "opened tracker"
    );
    Ok((Tracker::with_target(db, config.tracking.target_hours), user))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
