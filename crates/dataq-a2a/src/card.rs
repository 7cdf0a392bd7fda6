//! Agent card construction.
//!
//! One card for the whole platform, with one `query_<agent>` skill per
//! configured datasource so discovering peers can see what can be asked.

use crate::types::{AgentCapabilities, AgentCard, AgentSkill};
use dataq_agents::AgentRegistry;

pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["text", "text/plain"];

pub fn build_agent_card(host: &str, port: u16, registry: &AgentRegistry) -> AgentCard {
    let skills = registry
        .list()
        .iter()
        .map(|agent| AgentSkill {
            id: format!("query_{}", agent.name),
            name: format!("Query {}", agent.name),
            description: agent.description.clone(),
            tags: vec!["sql".to_string(), agent.datasource.kind.to_string()],
            examples: Vec::new(),
        })
        .collect();

    AgentCard {
        name: "dataq".to_string(),
        description: "Natural-language query agent over configured datasources".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        url: format!("http://{host}:{port}/"),
        capabilities: AgentCapabilities {
            streaming: false,
            push_notifications: false,
            state_transition_history: true,
        },
        default_input_modes: SUPPORTED_CONTENT_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
        default_output_modes: SUPPORTED_CONTENT_TYPES
            .iter()
            .map(|s| s.to_string())
            .collect(),
        skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataq_core::{
        AgentConfig, AgentsConfig, ConnectionDescriptor, DatasourceKind, DatasourceSpec,
        PromptOverrides,
    };

    fn agent(name: &str, kind: DatasourceKind) -> AgentConfig {
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

    #[test]
    fn test_card_has_one_skill_per_agent() {
        let registry = AgentRegistry::load(AgentsConfig {
            agents: vec![
                agent("sales", DatasourceKind::Postgres),
                agent("catalog", DatasourceKind::Cosmos),
            ],
        })
        .unwrap();

        let card = build_agent_card("localhost", 8080, &registry);
        assert_eq!(card.skills.len(), 2);
        let ids: Vec<_> = card.skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["query_catalog", "query_sales"]);
        assert_eq!(card.url, "http://localhost:8080/");
        assert!(card.capabilities.state_transition_history);
        assert!(!card.capabilities.streaming);
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let registry = AgentRegistry::load(AgentsConfig {
            agents: vec![agent("sales", DatasourceKind::Postgres)],
        })
        .unwrap();
        let json = serde_json::to_value(build_agent_card("localhost", 8080, &registry)).unwrap();
        assert!(json.get("defaultInputModes").is_some());
        assert!(json.get("capabilities").and_then(|c| c.get("pushNotifications")).is_some());
    }
}
