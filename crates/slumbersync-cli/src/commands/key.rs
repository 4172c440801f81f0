use clap::Subcommand;
use slumbersync_core::advice::{keyring_store, API_KEY_ENV, API_KEY_KEYRING};

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store the advice API key in the OS keyring
    Set {
        /// API key
        key: String,
    },
    /// Remove the stored advice API key
    Clear,
    /// Show where the API key would be read from
    Status,
}

pub fn run(action: KeyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        KeyAction::Set { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err("API key must not be empty".into());
            }
            keyring_store::set(API_KEY_KEYRING, key)?;
            println!("API key stored in keyring");
        }
        KeyAction::Clear => {
            keyring_store::delete(API_KEY_KEYRING)?;
            println!("API key removed");
        }
        KeyAction::Status => {
            let from_env = std::env::var(API_KEY_ENV)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if from_env {
                println!("Using {API_KEY_ENV} from the environment");
            } else if keyring_store::get(API_KEY_KEYRING)?.is_some() {
                println!("Using the key stored in the OS keyring");
            } else {
                println!("No API key configured");
            }
        }
    }
    Ok(())
}
