//! LLM Provider Trait and Selection
//!
//! Both consumers - routing classification and query generation - go through
//! the same two-message completion call with temperature 0.

use crate::azure::AzureOpenAiClient;
use crate::openai::OpenAiClient;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Opaque text-completion service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a system + user message pair into response text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    OpenAi,
    AzureOpenAi,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::OpenAi => write!(f, "openai"),
            ProviderType::AzureOpenAi => write!(f, "azure_openai"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(ProviderType::OpenAi),
            "azure_openai" | "azure" | "azureopenai" => Ok(ProviderType::AzureOpenAi),
            other => Err(format!("Unknown provider type: {}", other)),
        }
    }
}

/// Build a client from the environment.
///
/// `DATAQ_LLM_PROVIDER` selects the provider (default `openai`); each
/// provider reads its own variables, see [`OpenAiClient::from_env`] and
/// [`AzureOpenAiClient::from_env`].
pub fn client_from_env() -> Result<Arc<dyn LlmClient>> {
    let provider: ProviderType = std::env::var("DATAQ_LLM_PROVIDER")
        .unwrap_or_else(|_| "openai".to_string())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    info!(provider = %provider, "Selecting LLM provider");
    match provider {
        ProviderType::OpenAi => Ok(Arc::new(OpenAiClient::from_env()?)),
        ProviderType::AzureOpenAi => Ok(Arc::new(AzureOpenAiClient::from_env()?)),
    }
}

pub(crate) fn require_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("{key} is not set"),
    }
}
