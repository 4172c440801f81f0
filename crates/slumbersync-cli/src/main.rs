use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slumbersync", version, about = "SlumberSync nightly sleep tracker")]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Record today's hours of sleep
    Log {
        /// Hours slept (e.g. 7.5)
        hours: String,
    },
    /// Fill in missing days (DATE=HOURS pairs, or prompt when omitted)
    Backfill {
        entries: Vec<String>,
    },
    /// List missing days
    Gaps {
        #[arg(long)]
        json: bool,
    },
    #[command(flatten)]
    Stats(commands::stats::StatsAction),
    /// Coaching advice for the current sleep debt
    Advice,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Advice API key management
    Key {
        #[command(subcommand)]
        action: commands::key::KeyAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Log { hours } => commands::log::run_today(hours),
        Commands::Backfill { entries } => commands::log::run_backfill(entries),
        Commands::Gaps { json } => commands::log::run_gaps(json),
        Commands::Stats(action) => commands::stats::run(action),
        Commands::Advice => commands::advice::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Key { action } => commands::key::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "slumbersync",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flattened_stats_commands_parse() {
        let cli = Cli::try_parse_from(["slumbersync", "calendar", "--month", "2024-02"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats(commands::stats::StatsAction::Calendar { .. })
        ));
        let cli = Cli::try_parse_from(["slumbersync", "-v", "status", "--json"]).unwrap();
        assert!(cli.verbose);
    }
}
