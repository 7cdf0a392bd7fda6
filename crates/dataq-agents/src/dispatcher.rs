//! Request Dispatcher
//!
//! Per-request orchestration: resolve the target agent, build the prompt,
//! delegate execution to the family adapter, compose the answer. Stateless
//! per request apart from the registry snapshot taken at entry, so any
//! number of requests may run concurrently from either front-end.
//!
//! The router call and the adapter call are the only awaits on external
//! services; both honor the request's optional deadline. Adapter failures
//! surface with their sub-kind and are never retried here - a bad generated
//! query and a dropped connection need different recovery, and that choice
//! belongs to the caller.

use crate::registry::RegistryHandle;
use crate::response::{compose_no_match, compose_response};
use crate::router::IntentRouter;
use chrono::Utc;
use dataq_core::{
    AdapterSet, AgentConfig, Error, Result, RoutingDecision, Stage,
};
use dataq_llm::LlmClient;
use dataq_prompts::{general_chat_prompt, PromptContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One question for the platform to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Explicit target agent; set when the front-end already resolved one
    /// (e.g. a per-datasource tool call). Skips intent routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Deadline for each external call in the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            agent: None,
            timeout: None,
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The composed answer for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Agent that answered; None for general chat and no-match answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Value>,
    pub answer: String,
}

/// Per-request pipeline orchestrator. Cheap to share behind an `Arc`.
pub struct Dispatcher {
    registry: Arc<RegistryHandle>,
    router: IntentRouter,
    llm: Arc<dyn LlmClient>,
    adapters: AdapterSet,
}

impl Dispatcher {
    pub fn new(registry: Arc<RegistryHandle>, llm: Arc<dyn LlmClient>, adapters: AdapterSet) -> Self {
        Self {
            registry,
            router: IntentRouter::new(llm.clone()),
            llm,
            adapters,
        }
    }

    pub fn registry(&self) -> &Arc<RegistryHandle> {
        &self.registry
    }

    /// Run one question through the pipeline:
    /// received -> routed -> prompted -> executed -> formatted.
    pub async fn handle(&self, request: QueryRequest) -> Result<QueryResponse> {
        let registry = self.registry.snapshot().await;
        debug!(question = %request.question, explicit = ?request.agent, "Handling query");

        let decision = match request.agent.as_deref() {
            // the front-end already picked a target; validate, don't route
            Some(name) => RoutingDecision::Agent(registry.get(name)?.name.clone()),
            None => {
                deadline(
                    request.timeout,
                    Stage::Routed,
                    self.router.route(&request.question, &registry),
                )
                .await??
            }
        };

        let agent = match decision {
            RoutingDecision::Agent(name) => registry.get(&name)?,
            RoutingDecision::GeneralChat => {
                return self.general_chat(&request, &registry.catalog()).await;
            }
            RoutingDecision::NoMatch { candidates } => {
                info!("No datasource matched the question");
                return Ok(QueryResponse {
                    agent: None,
                    sql: None,
                    rows: None,
                    answer: compose_no_match(&candidates),
                });
            }
        };

        self.execute_for(&request, &agent).await
    }

    async fn execute_for(
        &self,
        request: &QueryRequest,
        agent: &Arc<AgentConfig>,
    ) -> Result<QueryResponse> {
        let today = Utc::now().date_naive();
        let prompt = PromptContext::new(agent, &request.question, today).system_prompt();

        let adapter = self.adapters.get(agent.datasource.kind)?;
        let output = deadline(
            request.timeout,
            Stage::Executed,
            adapter.execute(&prompt, &request.question, &agent.datasource.connection),
        )
        .await??;

        info!(
            agent = %agent.name,
            datasource = %agent.datasource.kind,
            has_rows = output.rows.is_some(),
            "Query executed"
        );

        let answer = compose_response(&agent.name, &output);
        Ok(QueryResponse {
            agent: Some(agent.name.clone()),
            sql: output.sql,
            rows: output.rows,
            answer,
        })
    }

    async fn general_chat(
        &self,
        request: &QueryRequest,
        catalog: &[(String, String)],
    ) -> Result<QueryResponse> {
        let prompt = general_chat_prompt(
            catalog
                .iter()
                .map(|(name, description)| (name.as_str(), description.as_str())),
        );

        // conversational fallback must not fail the request: completion
        // errors and deadline expiry both degrade to the datasource listing
        let completion = deadline(
            request.timeout,
            Stage::Executed,
            self.llm.complete(&prompt, &request.question),
        )
        .await
        .and_then(|r| r.map_err(Error::from));

        let answer = match completion {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "General chat completion failed");
                let names = catalog
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect::<Vec<_>>();
                compose_no_match(&names)
            }
        };

        Ok(QueryResponse {
            agent: None,
            sql: None,
            rows: None,
            answer,
        })
    }
}

/// Apply the caller's deadline to one pipeline await.
async fn deadline<F, T>(timeout: Option<Duration>, stage: Stage, fut: F) -> Result<T>
where
    F: Future<Output = T>,
{
    match timeout {
        Some(duration) => tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| Error::timeout(stage)),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dataq_core::{
        AgentsConfig, ConnectionDescriptor, DatasourceAdapter, DatasourceKind, ExecutionOutput,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedLlm {
        answer: String,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    /// Adapter that records the prompts it was given.
    struct RecordingAdapter {
        calls: AtomicUsize,
        prompts: std::sync::Mutex<Vec<String>>,
        fail_with: Option<fn() -> Error>,
    }

    impl RecordingAdapter {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: std::sync::Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(make: fn() -> Error) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: std::sync::Mutex::new(Vec::new()),
                fail_with: Some(make),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl DatasourceAdapter for RecordingAdapter {
        async fn execute(
            &self,
            prompt: &str,
            _question: &str,
            _connection: &ConnectionDescriptor,
        ) -> Result<ExecutionOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(make) = self.fail_with {
                return Err(make());
            }
            Ok(ExecutionOutput::generated("SELECT COUNT(*) FROM customers")
                .with_rows(json!([{"count": 42}])))
        }
    }

    fn dispatcher(
        agents: Vec<dataq_core::AgentConfig>,
        llm: Arc<ScriptedLlm>,
        adapter: Arc<RecordingAdapter>,
    ) -> Dispatcher {
        let registry = crate::registry::AgentRegistry::load(AgentsConfig { agents }).unwrap();
        let mut adapters = AdapterSet::new();
        adapters.register_all(adapter);
        Dispatcher::new(Arc::new(RegistryHandle::new(registry)), llm, adapters)
    }

    fn agent(name: &str, kind: DatasourceKind) -> dataq_core::AgentConfig {
        crate::registry::tests::agent(name, kind)
    }

    // Scenario A: one postgres agent, routing skipped, dialect in prompt.
    #[tokio::test]
    async fn test_single_agent_pipeline() {
        let llm = ScriptedLlm::new("should never be consulted for routing");
        let adapter = RecordingAdapter::ok();
        let dispatcher = dispatcher(
            vec![agent("sales", DatasourceKind::Postgres)],
            llm.clone(),
            adapter.clone(),
        );

        let response = dispatcher
            .handle(QueryRequest::new("How many customers?"))
            .await
            .unwrap();

        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.agent.as_deref(), Some("sales"));
        assert_eq!(adapter.call_count(), 1);
        assert!(adapter.last_prompt().contains("## PostgreSQL Guidelines"));
        assert!(response.answer.contains("| count |"));
    }

    // Scenario B: routed to hr; cosmos prompt carries the addendum, hr's not.
    #[tokio::test]
    async fn test_routing_and_family_addenda() {
        let adapter = RecordingAdapter::ok();
        let agents = vec![
            agent("hr", DatasourceKind::AzureSql),
            agent("catalog", DatasourceKind::Cosmos),
        ];

        let dispatcher_hr = dispatcher(agents.clone(), ScriptedLlm::new("hr"), adapter.clone());
        let response = dispatcher_hr
            .handle(QueryRequest::new("How many employees joined this year?"))
            .await
            .unwrap();
        assert_eq!(response.agent.as_deref(), Some("hr"));
        assert!(adapter.last_prompt().contains("## Azure SQL / SQL Server Guidelines"));
        assert!(!adapter.last_prompt().contains("Key Cosmos DB constraints"));

        let dispatcher_catalog =
            dispatcher(agents, ScriptedLlm::new("catalog"), adapter.clone());
        let response = dispatcher_catalog
            .handle(QueryRequest::new("Which products are low on stock?"))
            .await
            .unwrap();
        assert_eq!(response.agent.as_deref(), Some("catalog"));
        assert!(adapter.last_prompt().contains("Key Cosmos DB constraints"));
    }

    // Scenario C: transport failure surfaces at executed, no retry.
    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let adapter = RecordingAdapter::failing(|| Error::transport("connection reset"));
        let dispatcher = dispatcher(
            vec![agent("sales", DatasourceKind::Postgres)],
            ScriptedLlm::new("sales"),
            adapter.clone(),
        );

        let err = dispatcher
            .handle(QueryRequest::new("How many customers?"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Executed);
        assert!(matches!(
            err,
            Error::Execution {
                kind: dataq_core::ExecutionErrorKind::Transport,
                ..
            }
        ));
        assert_eq!(adapter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_explicit_agent_skips_routing() {
        let llm = ScriptedLlm::new("catalog");
        let adapter = RecordingAdapter::ok();
        let dispatcher = dispatcher(
            vec![
                agent("hr", DatasourceKind::AzureSql),
                agent("catalog", DatasourceKind::Cosmos),
            ],
            llm.clone(),
            adapter.clone(),
        );

        let response = dispatcher
            .handle(QueryRequest::new("count documents").with_agent("hr"))
            .await
            .unwrap();

        assert_eq!(response.agent.as_deref(), Some("hr"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_unknown_agent_rejected() {
        let dispatcher = dispatcher(
            vec![agent("sales", DatasourceKind::Postgres)],
            ScriptedLlm::new("sales"),
            RecordingAdapter::ok(),
        );

        let err = dispatcher
            .handle(QueryRequest::new("q").with_agent("marketing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAgent(_)));
    }

    #[tokio::test]
    async fn test_general_chat_answers_without_adapter() {
        let adapter = RecordingAdapter::ok();
        let dispatcher = dispatcher(
            vec![
                agent("hr", DatasourceKind::AzureSql),
                agent("catalog", DatasourceKind::Cosmos),
            ],
            ScriptedLlm::new("general_chat"),
            adapter.clone(),
        );

        let response = dispatcher.handle(QueryRequest::new("hello!")).await.unwrap();
        assert!(response.agent.is_none());
        assert!(response.sql.is_none());
        assert_eq!(adapter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_match_lists_datasources() {
        let dispatcher = dispatcher(
            vec![
                agent("hr", DatasourceKind::AzureSql),
                agent("catalog", DatasourceKind::Cosmos),
            ],
            ScriptedLlm::new("unknown"),
            RecordingAdapter::ok(),
        );

        let response = dispatcher
            .handle(QueryRequest::new("what's the weather?"))
            .await
            .unwrap();
        assert!(response.agent.is_none());
        assert!(response.answer.contains("- hr"));
        assert!(response.answer.contains("- catalog"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_stage() {
        struct SlowAdapter;

        #[async_trait]
        impl DatasourceAdapter for SlowAdapter {
            async fn execute(
                &self,
                _prompt: &str,
                _question: &str,
                _connection: &ConnectionDescriptor,
            ) -> Result<ExecutionOutput> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(ExecutionOutput::default())
            }
        }

        let registry = crate::registry::AgentRegistry::load(AgentsConfig {
            agents: vec![agent("sales", DatasourceKind::Postgres)],
        })
        .unwrap();
        let mut adapters = AdapterSet::new();
        adapters.register_all(Arc::new(SlowAdapter));
        let dispatcher = Dispatcher::new(
            Arc::new(RegistryHandle::new(registry)),
            ScriptedLlm::new("sales"),
            adapters,
        );

        tokio::time::pause();
        let handle = tokio::spawn(async move {
            dispatcher
                .handle(QueryRequest::new("q").with_timeout(Duration::from_millis(50)))
                .await
        });
        tokio::time::advance(Duration::from_secs(1)).await;
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Timeout { stage: Stage::Executed }));
    }

    // Deadline expiry on the general-chat completion degrades to the
    // datasource listing, same as a completion error.
    #[tokio::test]
    async fn test_general_chat_timeout_falls_back() {
        struct StallingChatLlm {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl LlmClient for StallingChatLlm {
            async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
                // first call is the routing classification
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Ok("general_chat".to_string());
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("hello there".to_string())
            }
        }

        let registry = crate::registry::AgentRegistry::load(AgentsConfig {
            agents: vec![
                agent("hr", DatasourceKind::AzureSql),
                agent("catalog", DatasourceKind::Cosmos),
            ],
        })
        .unwrap();
        let mut adapters = AdapterSet::new();
        adapters.register_all(RecordingAdapter::ok());
        let dispatcher = Dispatcher::new(
            Arc::new(RegistryHandle::new(registry)),
            Arc::new(StallingChatLlm {
                calls: AtomicUsize::new(0),
            }),
            adapters,
        );

        tokio::time::pause();
        let handle = tokio::spawn(async move {
            dispatcher
                .handle(QueryRequest::new("hello!").with_timeout(Duration::from_millis(50)))
                .await
        });
        tokio::time::advance(Duration::from_secs(1)).await;
        let response = handle.await.unwrap().unwrap();

        assert!(response.agent.is_none());
        assert!(response.answer.contains("- hr"));
        assert!(response.answer.contains("- catalog"));
    }
}
