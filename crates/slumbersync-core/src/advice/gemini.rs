//! Gemini `generateContent` client for sleep coaching.

use indoc::formatdoc;
use reqwest::{Client, StatusCode};
use serde_json::json;
use url::Url;

use super::{AdviceError, AdviceProvider, AdviceRequest};
use crate::storage::AdviceConfig;

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    enabled: bool,
    http_client: Client,
}

impl GeminiClient {
    /// Create a client from config and an optional API key.
    pub fn new(config: &AdviceConfig, api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            enabled: config.enabled,
            http_client: Client::new(),
        }
    }

    fn endpoint(&self) -> Result<Url, AdviceError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AdviceError::Transport(format!("bad base URL '{}': {e}", self.base_url)))?;
        base.join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| AdviceError::Transport(format!("bad model name '{}': {e}", self.model)))
    }

    async fn call(&self, api_key: &str, prompt: &str) -> Result<String, AdviceError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let resp = self
            .http_client
            .post(self.endpoint()?)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AdviceError::Transport(e.to_string()))?;
        let advice = value["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if advice.trim().is_empty() {
            return Err(AdviceError::Empty);
        }
        Ok(advice)
    }
}

/// Map an unsuccessful response onto an advice failure category.
fn classify_failure(status: StatusCode, body: &str) -> AdviceError {
    if body.contains("RESOURCE_EXHAUSTED") || body.to_ascii_lowercase().contains("quota") {
        AdviceError::QuotaExceeded
    } else if body.contains("API_KEY_INVALID") {
        AdviceError::InvalidCredentials
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        AdviceError::RateLimited
    } else {
        AdviceError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        }
    }
}

/// Prompt sent to the model.
pub fn build_prompt(request: &AdviceRequest) -> String {
    formatdoc! {"
        You are a compassionate but scientifically accurate sleep health assistant.
        The user has a current accumulated sleep debt of {debt:.1} hours.
        Their current streak of good sleep (>= {target} hours) is {streak} days.
        Their classified debt level is: {level}.

        1. Explain the specific health consequences of this specific level of sleep debt (cognitive, physical, emotional).
        2. If the debt is high, be firm about the risks. If low, congratulate them.
        3. Provide a specific, actionable estimation for recovery (e.g., \"Try to sleep {recovery} hours for the next X days\").
        4. Keep the tone encouraging but serious about health.
        5. Keep the response under 100 words.
        ",
        debt = request.total_debt,
        streak = request.streak,
        level = request.level,
        target = request.target_hours,
        recovery = request.target_hours + 1.0,
    }
}

impl AdviceProvider for GeminiClient {
    async fn generate(&self, request: &AdviceRequest) -> Result<String, AdviceError> {
        if !self.enabled {
            return Err(AdviceError::Disabled);
        }
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AdviceError::NotConfigured)?;

        tracing::debug!(model = %self.model, level = %request.level, "requesting sleep advice");
        self.call(api_key, &build_prompt(request)).await
    }
}
