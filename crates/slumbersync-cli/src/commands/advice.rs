use std::time::Duration;

use slumbersync_core::advice::{resolve_api_key, Coach};
use slumbersync_core::storage::AdviceConfig;
use slumbersync_core::{today_local, Config, GeminiClient};

use super::open_tracker;

/// Print coaching text for the current debt and streak.
///
/// Always prints something: provider failures become a fallback message.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let (tracker, _user) = open_tracker()?;
    let dashboard = tracker.load(today_local())?;

    let api_key = api_key_for(&config.advice, resolve_api_key);
    let coach = Coach::new(
        GeminiClient::new(&config.advice, api_key),
        Duration::from_secs(config.advice.timeout_secs),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let text = runtime.block_on(coach.advise(&dashboard.summary, dashboard.target_hours));

    println!("AI Sleep Coach");
    println!("{text}");
    Ok(())
}

/// Only look up the key (environment, then keyring) when advice is on.
fn api_key_for(config: &AdviceConfig, resolve: impl FnOnce() -> Option<String>) -> Option<String> {
    if config.enabled {
        resolve()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn disabled_advice_never_looks_up_the_key() {
        let looked_up = Cell::new(false);
        let config = AdviceConfig {
            enabled: false,
            ..AdviceConfig::default()
        };
        let key = api_key_for(&config, || {
            looked_up.set(true);
            Some("secret".into())
        });
        assert_eq!(key, None);
        assert!(!looked_up.get());
    }

    #[test]
    fn enabled_advice_uses_the_resolved_key() {
        let key = api_key_for(&AdviceConfig::default(), || Some("secret".into()));
        assert_eq!(key.as_deref(), Some("secret"));
    }
}
