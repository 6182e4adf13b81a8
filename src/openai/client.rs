// Authenticated HTTP client for the OpenAI REST API.
//
// A thin reqwest wrapper with a generic JSON POST helper. Every request
// carries the client-wide timeout, so a stalled call fails the attempt
// instead of blocking a worker forever.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Shared OpenAI client. Cheap to clone: reqwest pools connections internally.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("OpenAI API key is empty");
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("aggression-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// POST a JSON body to `{base_url}/{path}` and deserialize the response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        debug!(path = path, "OpenAI POST request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("OpenAI request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }
}
