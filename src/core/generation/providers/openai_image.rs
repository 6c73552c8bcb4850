//! OpenAI image adapter (images/generations endpoint).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ArtifactTier, ImagePrompt, ImageProvider, ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Image provider backed by OpenAI's image generation endpoint.
///
/// The endpoint takes no seed parameter, so the reproducibility seed is
/// accepted and ignored; cache-level determinism still holds because the
/// artifact reference is cached under the prompt fingerprint.
pub struct OpenAiImageProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiImageProvider {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.trim().to_string(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn id(&self) -> &str {
        "openai-image"
    }

    fn tier(&self) -> ArtifactTier {
        ArtifactTier::Authenticated
    }

    async fn generate(&self, prompt: &ImagePrompt, _seed: u64) -> ProviderResult<String> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Misconfigured(
                "OpenAI API key is empty — add one under provider settings".to_string(),
            ));
        }

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt.text(),
            "n": 1,
            "size": "1024x1024",
        });

        let resp = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let json: serde_json::Value = resp.json().await?;
        json["data"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|d| d["url"].as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse("missing image url".to_string()))
    }
}
