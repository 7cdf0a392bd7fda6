//! Agent Registry
//!
//! Process-wide catalog of configured datasource agents. Loaded and
//! validated once, then shared read-only; reconfiguration publishes a whole
//! new snapshot through [`RegistryHandle`] instead of mutating in place, so
//! in-flight requests keep the snapshot they started with.

use dataq_core::{AgentConfig, AgentsConfig, Error, Result};
use dataq_prompts::guidelines;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Immutable, validated catalog of agents.
#[derive(Debug)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<AgentConfig>>,
}

impl AgentRegistry {
    /// Validate a merged configuration and build the registry.
    ///
    /// Fails with `Error::Configuration` on an empty agent list, duplicate
    /// names, a datasource family with no dialect guidance, or credentials
    /// missing for the declared auth mode.
    pub fn load(config: AgentsConfig) -> Result<Self> {
        if config.agents.is_empty() {
            return Err(Error::configuration("no agents configured"));
        }

        let mut agents = BTreeMap::new();
        for agent in config.agents {
            agent.validate_credentials()?;

            // an agent must never load against a silent dialect gap
            if guidelines(agent.datasource.kind).is_empty() {
                return Err(Error::configuration(format!(
                    "no dialect guidance for datasource type {}",
                    agent.datasource.kind
                )));
            }

            let name = agent.name.clone();
            if agents.insert(name.clone(), Arc::new(agent)).is_some() {
                return Err(Error::configuration(format!(
                    "duplicate agent name: {name}"
                )));
            }
        }

        info!(agents = agents.len(), "Agent registry loaded");
        Ok(Self { agents })
    }

    pub fn get(&self, name: &str) -> Result<Arc<AgentConfig>> {
        self.agents
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_agent(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// All agents in stable (name) order.
    pub fn list(&self) -> Vec<Arc<AgentConfig>> {
        self.agents.values().cloned().collect()
    }

    /// Agent names in stable order.
    pub fn names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// (name, description) pairs for the routing classifier.
    pub fn catalog(&self) -> Vec<(String, String)> {
        self.agents
            .values()
            .map(|a| (a.name.clone(), a.description.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Atomically replaceable registry reference.
///
/// Readers take an `Arc` snapshot and never block writers; `replace`
/// publishes a new snapshot wholesale. The old snapshot stays alive until
/// the last in-flight request drops it.
pub struct RegistryHandle {
    inner: RwLock<Arc<AgentRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            inner: RwLock::new(Arc::new(registry)),
        }
    }

    pub async fn snapshot(&self) -> Arc<AgentRegistry> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, registry: AgentRegistry) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(registry);
        info!(agents = guard.len(), "Agent registry replaced");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dataq_core::{ConnectionDescriptor, DatasourceKind, DatasourceSpec, PromptOverrides};

    pub(crate) fn agent(name: &str, kind: DatasourceKind) -> AgentConfig {
        AgentConfig {
            name: name.into(),
            description: format!("{name} data"),
            datasource: DatasourceSpec {
                kind,
                connection: ConnectionDescriptor {
                    password: Some("secret".into()),
                    ..Default::default()
                },
            },
            schema_context: None,
            few_shot_examples: None,
            prompts: PromptOverrides::default(),
        }
    }

    fn config(agents: Vec<AgentConfig>) -> AgentsConfig {
        AgentsConfig { agents }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = AgentRegistry::load(config(vec![
            agent("sales", DatasourceKind::Postgres),
            agent("sales", DatasourceKind::BigQuery),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_config_rejected() {
        let err = AgentRegistry::load(config(vec![])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_missing_credentials_rejected_at_load() {
        let mut bad = agent("hr", DatasourceKind::AzureSql);
        bad.datasource.connection.password = None;
        let err = AgentRegistry::load(config(vec![bad])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_get_unknown_agent() {
        let registry =
            AgentRegistry::load(config(vec![agent("sales", DatasourceKind::Postgres)])).unwrap();
        assert!(matches!(
            registry.get("marketing").unwrap_err(),
            Error::UnknownAgent(_)
        ));
    }

    #[test]
    fn test_list_is_stable_ordered() {
        let registry = AgentRegistry::load(config(vec![
            agent("zeta", DatasourceKind::Postgres),
            agent("alpha", DatasourceKind::Cosmos),
        ]))
        .unwrap();
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_handle_replaces_snapshot_atomically() {
        let handle = RegistryHandle::new(
            AgentRegistry::load(config(vec![agent("sales", DatasourceKind::Postgres)])).unwrap(),
        );
        let before = handle.snapshot().await;

        handle
            .replace(
                AgentRegistry::load(config(vec![
                    agent("sales", DatasourceKind::Postgres),
                    agent("hr", DatasourceKind::AzureSql),
                ]))
                .unwrap(),
            )
            .await;

        // the old snapshot is still intact for requests that hold it
        assert_eq!(before.len(), 1);
        assert_eq!(handle.snapshot().await.len(), 2);
    }
}
