//! Sleep coaching text.
//!
//! Advice is an opaque function of (debt, streak, level, target). Providers may fail
//! in any way; [`advice_or_fallback`] is the boundary that turns every failure
//! into a message the user can read, so nothing past it ever sees an error.

pub mod gemini;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sleep::{DebtLevel, SleepSummary};

pub use gemini::GeminiClient;

/// Environment variable holding the advice API key.
pub const API_KEY_ENV: &str = "SLUMBERSYNC_API_KEY";
/// Keyring entry holding the advice API key.
pub const API_KEY_KEYRING: &str = "advice_api_key";

/// Shown when there is nothing to coach on yet.
pub const NO_DATA_MESSAGE: &str = "Start logging your sleep to get personalized advice!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub total_debt: f64,
    pub streak: u32,
    pub level: DebtLevel,
    /// Nightly target the debt and streak were computed against.
    pub target_hours: f64,
}

impl AdviceRequest {
    pub fn new(summary: &SleepSummary, target_hours: f64) -> Self {
        Self {
            total_debt: summary.total_debt,
            streak: summary.streak,
            level: summary.level,
            target_hours,
        }
    }

    /// Advice is only worth asking for once there is debt or a streak.
    pub fn is_worth_asking(&self) -> bool {
        self.total_debt > 0.0 || self.streak > 0
    }
}

/// Ways an advice provider can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdviceError {
    #[error("advice generation is disabled")]
    Disabled,

    #[error("no API key configured")]
    NotConfigured,

    #[error("API quota exhausted")]
    QuotaExceeded,

    #[error("API key rejected")]
    InvalidCredentials,

    #[error("rate limited")]
    RateLimited,

    #[error("provider returned no text")]
    Empty,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl AdviceError {
    /// The text shown in place of advice.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Disabled => "AI sleep coaching is turned off. Enable it with `slumbersync config set advice.enabled true`.",
            Self::NotConfigured => "AI insights are unavailable. Please configure your API key to receive personalized sleep coaching.",
            Self::QuotaExceeded => "API quota exceeded. You've run out of free tokens. Please wait or upgrade your API key.",
            Self::InvalidCredentials => "Invalid API key. Please check your configuration.",
            Self::RateLimited => "Too many requests. Please wait a moment and try again.",
            Self::Empty => "Unable to generate advice at this time.",
            Self::Timeout(_) | Self::Api { .. } | Self::Transport(_) => {
                "I'm having trouble connecting to the AI assistant right now. Remember: Consistency is key! Aim to meet your nightly sleep target."
            }
        }
    }
}

/// Something that turns a debt summary into coaching text.
pub trait AdviceProvider {
    fn generate(
        &self,
        request: &AdviceRequest,
    ) -> impl Future<Output = Result<String, AdviceError>> + Send;
}

/// Ask `provider` for advice, bounded by `timeout`.
///
/// Never fails: every error becomes its fallback message.
pub async fn advice_or_fallback<P: AdviceProvider>(
    provider: &P,
    request: &AdviceRequest,
    timeout: Duration,
) -> String {
    let outcome = match tokio::time::timeout(timeout, provider.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(AdviceError::Timeout(timeout)),
    };

    match outcome {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => AdviceError::Empty.fallback_message().to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "advice generation failed, using fallback");
            err.fallback_message().to_string()
        }
    }
}

/// Coaching front end: decides whether to ask at all, then asks.
pub struct Coach<P> {
    provider: P,
    timeout: Duration,
}

impl<P: AdviceProvider> Coach<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Advice for `summary` computed against `target_hours`, or the no-data
    /// placeholder when there is no debt and no streak yet.
    pub async fn advise(&self, summary: &SleepSummary, target_hours: f64) -> String {
        let request = AdviceRequest::new(summary, target_hours);
        if !request.is_worth_asking() {
            return NO_DATA_MESSAGE.to_string();
        }
        advice_or_fallback(&self.provider, &request, self.timeout).await
    }
}

/// Find the advice API key: the environment first, then the OS keyring.
pub fn resolve_api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }
    match keyring_store::get(API_KEY_KEYRING) {
        Ok(key) => key.filter(|k| !k.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "could not read API key from keyring");
            None
        }
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::ConfigError;

    const SERVICE: &str = "slumbersync";

    fn entry(key: &str) -> Result<keyring::Entry, ConfigError> {
        keyring::Entry::new(SERVICE, key).map_err(|e| ConfigError::Keyring(e.to_string()))
    }

    pub fn get(key: &str) -> Result<Option<String>, ConfigError> {
        match entry(key)?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ConfigError::Keyring(e.to_string())),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), ConfigError> {
        entry(key)?
            .set_password(value)
            .map_err(|e| ConfigError::Keyring(e.to_string()))
    }

    pub fn delete(key: &str) -> Result<(), ConfigError> {
        match entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ConfigError::Keyring(e.to_string())),
        }
    }
}
