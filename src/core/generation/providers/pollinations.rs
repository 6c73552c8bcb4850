//! Pollinations image adapter.
//!
//! Generation is URL-addressed: the artifact reference is a prompt URL the
//! backend renders on first fetch. The keyless variant composes that URL
//! locally and performs no I/O at all, which is what makes it the terminal
//! fallback of every image chain: it is defined to never fail. The
//! authenticated variant (token configured) requests the render up front
//! under the credential, so quota and auth failures classify normally and
//! fall through the chain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ArtifactTier, ImagePrompt, ImageProvider, ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";

/// Image provider backed by the Pollinations prompt-URL service.
pub struct PollinationsProvider {
    token: Option<String>,
    base_url: String,
    client: Client,
}

impl PollinationsProvider {
    /// The zero-configuration, no-credential variant.
    pub fn keyless() -> Self {
        Self::build(None)
    }

    /// The authenticated-tier variant.
    pub fn authenticated(token: String) -> Self {
        Self::build(Some(token))
    }

    fn build(token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Compose the artifact URL for a prompt and seed. Pure: this is the
    /// infallible path the orchestrator's terminal fallback relies on.
    /// The credential never appears in the URL; it travels in a header.
    pub fn compose_url(&self, prompt: &ImagePrompt, seed: u64) -> String {
        format!(
            "{}/prompt/{}?width=640&height=640&seed={}&nologo=true",
            self.base_url,
            urlencoding::encode(&prompt.text()),
            seed
        )
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn id(&self) -> &str {
        "pollinations"
    }

    fn tier(&self) -> ArtifactTier {
        if self.token.is_some() {
            ArtifactTier::Authenticated
        } else {
            ArtifactTier::Anonymous
        }
    }

    async fn generate(&self, prompt: &ImagePrompt, seed: u64) -> ProviderResult<String> {
        let url = self.compose_url(prompt, seed);

        match &self.token {
            // Keyless tier: the URL is the artifact. No request, no failure.
            None => Ok(url),
            // Authenticated tier: render up front under the credential so
            // auth/quota problems surface here and classify.
            Some(token) => {
                let resp = self.client.get(&url).bearer_auth(token).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    let text = resp.text().await.unwrap_or_default();
                    return Err(ProviderError::from_status(status.as_u16(), text));
                }
                Ok(url)
            }
        }
    }
}
