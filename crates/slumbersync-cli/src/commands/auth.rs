use clap::Subcommand;
use slumbersync_core::{Database, SessionStore};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Start a session
    Login {
        /// Email address
        email: String,
    },
    /// End the current session
    Logout,
    /// Show who is logged in
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        AuthAction::Login { email } => {
            let user = db.login(&email)?;
            println!("Welcome, {}", user.display_name);
        }
        AuthAction::Logout => {
            db.logout()?;
            println!("logged out");
        }
        AuthAction::Status => match db.current_user()? {
            Some(user) => println!("Logged in as {} <{}>", user.display_name, user.email),
            None => println!("Not logged in"),
        },
    }
    Ok(())
}
