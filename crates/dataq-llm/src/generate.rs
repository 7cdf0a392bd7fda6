//! LLM-backed query generation adapter.
//!
//! Implements the datasource adapter seam for deployments where dataq only
//! generates the dialect query and a downstream system executes it. A real
//! driver adapter replaces this behind the same trait; the dispatcher cannot
//! tell the difference.

use crate::provider::LlmClient;
use async_trait::async_trait;
use dataq_core::{ConnectionDescriptor, DatasourceAdapter, Error, ExecutionOutput, Result};
use dataq_prompts::clean_sql_query;
use std::sync::Arc;
use tracing::{debug, warn};

/// Generates the query for a question via the LLM and returns it unexecuted.
pub struct SqlGenerationAdapter {
    llm: Arc<dyn LlmClient>,
}

impl SqlGenerationAdapter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DatasourceAdapter for SqlGenerationAdapter {
    async fn execute(
        &self,
        prompt: &str,
        question: &str,
        _connection: &ConnectionDescriptor,
    ) -> Result<ExecutionOutput> {
        let completion = self
            .llm
            .complete(prompt, question)
            .await
            .map_err(|e| Error::transport(format!("query generation call failed: {e}")))?;

        let sql = clean_sql_query(&completion);
        if sql.is_empty() {
            warn!("Model returned an empty query");
            return Err(Error::invalid_query("model returned an empty query"));
        }

        debug!(sql = %sql, "Generated query");
        Ok(ExecutionOutput::generated(sql))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenLlm;

    #[async_trait]
    impl LlmClient for BrokenLlm {
        async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_generates_and_cleans_query() {
        let adapter = SqlGenerationAdapter::new(Arc::new(FixedLlm(
            "```sql\nSELECT COUNT(*) FROM customers;\n```",
        )));
        let out = adapter
            .execute("prompt", "how many customers?", &ConnectionDescriptor::default())
            .await
            .unwrap();
        assert_eq!(out.sql.as_deref(), Some("SELECT COUNT(*) FROM customers"));
        assert!(out.rows.is_none());
    }

    #[tokio::test]
    async fn test_llm_failure_is_transport_error() {
        let adapter = SqlGenerationAdapter::new(Arc::new(BrokenLlm));
        let err = adapter
            .execute("prompt", "q", &ConnectionDescriptor::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution {
                kind: dataq_core::ExecutionErrorKind::Transport,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_completion_is_invalid_query() {
        let adapter = SqlGenerationAdapter::new(Arc::new(FixedLlm("   ")));
        let err = adapter
            .execute("prompt", "q", &ConnectionDescriptor::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution {
                kind: dataq_core::ExecutionErrorKind::InvalidQuery,
                ..
            }
        ));
    }
}
