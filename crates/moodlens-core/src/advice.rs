use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::CoreConfig;

/// Analysis returned by the remote sentiment/advice service.
#[derive(Debug, Clone, Deserialize)]
pub struct AdviceResponse {
    pub emotion: String,
    pub advice: String,
}

/// Client for the remote advice endpoint. One request, one generic failure
/// mode; retry is up to the user.
pub struct AdviceClient {
    http: reqwest::Client,
    base: String,
}

impl AdviceClient {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.advice_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_advice(&self, text: &str) -> Result<AdviceResponse> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("diary text is empty");
        }

        let url = format!("{}/getadvice", self.base);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("Failed to reach advice service")?;

        if !response.status().is_success() {
            anyhow::bail!("advice service error ({})", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse advice response")
    }
}
