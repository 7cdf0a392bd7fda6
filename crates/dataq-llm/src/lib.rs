//! dataq-llm: text-completion providers
//!
//! The rest of the platform treats the LLM as an opaque
//! `complete(system, user) -> text` service behind the [`LlmClient`] trait.
//! Providers here speak the OpenAI chat-completions wire format, plain or
//! Azure-flavored.

pub mod azure;
pub mod generate;
pub mod openai;
pub mod provider;

pub use azure::AzureOpenAiClient;
pub use generate::SqlGenerationAdapter;
pub use openai::OpenAiClient;
pub use provider::{client_from_env, LlmClient, ProviderType};
