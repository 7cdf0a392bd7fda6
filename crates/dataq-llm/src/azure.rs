//! Azure OpenAI Chat Completions Client
//!
//! Same wire format as OpenAI, different addressing: requests go to a
//! deployment under the resource endpoint with an `api-version` query and an
//! `api-key` header.
//!
//! ## Environment
//! - `AZURE_OPENAI_ENDPOINT` - e.g. `https://myresource.openai.azure.com`
//! - `AZURE_OPENAI_API_KEY`
//! - `AZURE_OPENAI_DEPLOYMENT` - deployed model name
//! - `AZURE_OPENAI_API_VERSION` - optional, defaults below

use crate::provider::{require_env, LlmClient};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_VERSION: &str = "2024-08-01-preview";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Azure OpenAI chat client
pub struct AzureOpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Build from the `AZURE_OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut client = Self::new(
            require_env("AZURE_OPENAI_ENDPOINT")?,
            require_env("AZURE_OPENAI_API_KEY")?,
            require_env("AZURE_OPENAI_DEPLOYMENT")?,
        );
        if let Ok(api_version) = std::env::var("AZURE_OPENAI_API_VERSION") {
            client = client.with_api_version(api_version);
        }
        Ok(client)
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl LlmClient for AzureOpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = self.chat_url();
        let body = json!({
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0,
        });

        debug!(deployment = %self.deployment, "Sending Azure chat completion request");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .context("Azure chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Azure chat completion returned {status}: {body}");
        }

        let parsed: Value = response
            .json()
            .await
            .context("failed to decode Azure chat completion response")?;

        match parsed
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
        {
            Some(text) => Ok(text.to_string()),
            None => bail!("Azure chat completion response had no content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_shape() {
        let client = AzureOpenAiClient::new("https://r.openai.azure.com/", "key", "gpt-4o");
        assert_eq!(
            client.chat_url(),
            format!(
                "https://r.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version={DEFAULT_API_VERSION}"
            )
        );
    }
}
