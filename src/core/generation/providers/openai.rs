//! OpenAI text adapter (chat completions, JSON mode).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{
    parse_json_payload, prompts, validate_batch, BatchPayload, ExamplePayload, GeneratedEntry,
    ProviderError, ProviderResult, TextProvider, Translation, TranslationPayload, Verification,
    VerifyPayload,
};
use crate::core::vocabulary::ProficiencyLevel;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Text provider backed by OpenAI's chat completions endpoint, using
/// JSON-object response mode so every task returns a parseable payload.
pub struct OpenAiTextProvider {
    api_key: String,
    model: String,
    target_language: String,
    base_url: String,
    client: Client,
}

impl OpenAiTextProvider {
    pub fn new(api_key: String, model: String, target_language: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: api_key.trim().to_string(),
            model,
            target_language,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run one instruction through chat completions and return the raw
    /// message content, which the caller parses as a JSON payload.
    async fn complete(&self, instruction: &str) -> ProviderResult<String> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Misconfigured(
                "OpenAI API key is empty — add one under provider settings".to_string(),
            ));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": instruction }],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
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
        json["choices"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|c| c["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing message content".to_string())
            })
    }
}

#[async_trait]
impl TextProvider for OpenAiTextProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn generate_batch(
        &self,
        topic: &str,
        level: ProficiencyLevel,
        count: usize,
        exclude: &[String],
    ) -> ProviderResult<Vec<GeneratedEntry>> {
        let instruction = prompts::batch(topic, level, count, exclude, &self.target_language);
        let raw = self.complete(&instruction).await?;
        let payload: BatchPayload = parse_json_payload(&raw)?;
        validate_batch(payload)
    }

    async fn translate(&self, term: &str, source_language: &str) -> ProviderResult<Translation> {
        let instruction = prompts::translate(term, source_language, &self.target_language);
        let raw = self.complete(&instruction).await?;
        let payload: TranslationPayload = parse_json_payload(&raw)?;
        if payload.translation.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "empty translation".to_string(),
            ));
        }
        Ok(Translation {
            translation: payload.translation,
            example: payload.example,
        })
    }

    async fn generate_example(
        &self,
        headword: &str,
        context: Option<&str>,
    ) -> ProviderResult<String> {
        let instruction = prompts::example(headword, context, &self.target_language);
        let raw = self.complete(&instruction).await?;
        let payload: ExamplePayload = parse_json_payload(&raw)?;
        if payload.sentence.trim().is_empty() {
            return Err(ProviderError::InvalidResponse("empty sentence".to_string()));
        }
        Ok(payload.sentence)
    }

    async fn verify_answer(
        &self,
        expected_gloss: &str,
        learner_input: &str,
    ) -> ProviderResult<Verification> {
        let instruction = prompts::verify(expected_gloss, learner_input);
        let raw = self.complete(&instruction).await?;
        let payload: VerifyPayload = parse_json_payload(&raw)?;
        Ok(Verification::Judged {
            correct: payload.correct,
            feedback: payload.feedback,
        })
    }
}
