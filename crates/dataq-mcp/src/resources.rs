//! MCP resources built from the live registry snapshot.
//!
//! - `datasources://list` - all configured agents with their families
//! - `schema://{name}` - schema context for one agent

use dataq_agents::AgentRegistry;
use serde::{Deserialize, Serialize};

pub const DATASOURCES_URI: &str = "datasources://list";
pub const SCHEMA_URI_PREFIX: &str = "schema://";

/// Resource descriptor for resources/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// List resources for the current registry snapshot.
pub fn list_resources(registry: &AgentRegistry) -> Vec<ResourceInfo> {
    let mut resources = vec![ResourceInfo {
        uri: DATASOURCES_URI.to_string(),
        name: "Configured datasources".to_string(),
        description: Some("All datasource agents available for querying".to_string()),
        mime_type: Some("text/markdown".to_string()),
    }];

    for agent in registry.list() {
        resources.push(ResourceInfo {
            uri: format!("{SCHEMA_URI_PREFIX}{}", agent.name),
            name: format!("Schema for {}", agent.name),
            description: Some(format!("Database schema for the {} agent", agent.name)),
            mime_type: Some("text/plain".to_string()),
        });
    }
    resources
}

/// Read one resource; None if the URI is unknown.
pub fn read_resource(registry: &AgentRegistry, uri: &str) -> Option<String> {
    if uri == DATASOURCES_URI {
        return Some(render_datasources(registry));
    }
    if let Some(name) = uri.strip_prefix(SCHEMA_URI_PREFIX) {
        let agent = registry.get(name).ok()?;
        return Some(render_schema(&agent));
    }
    None
}

pub(crate) fn render_datasources(registry: &AgentRegistry) -> String {
    let mut lines = vec!["**Available Datasources:**".to_string(), String::new()];
    for agent in registry.list() {
        let mut line = format!("- **{}** ({})", agent.name, agent.datasource.kind);
        if !agent.description.is_empty() {
            line.push_str(&format!(": {}", agent.description));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub(crate) fn render_schema(agent: &dataq_core::AgentConfig) -> String {
    match agent.schema_context.as_deref() {
        Some(schema) => format!("**Schema for {}:**\n\n{schema}", agent.name),
        None => format!(
            "No schema context configured for '{}'. The {} backend will be \
             queried without schema hints.",
            agent.name, agent.datasource.kind
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataq_core::{
        AgentConfig, AgentsConfig, ConnectionDescriptor, DatasourceKind, DatasourceSpec,
        PromptOverrides,
    };

    fn registry() -> AgentRegistry {
        let agents = vec![AgentConfig {
            name: "sales".into(),
            description: "Retail sales".into(),
            datasource: DatasourceSpec {
                kind: DatasourceKind::Postgres,
                connection: ConnectionDescriptor {
                    password: Some("x".into()),
                    ..Default::default()
                },
            },
            schema_context: Some("CREATE TABLE customers (id int)".into()),
            few_shot_examples: None,
            prompts: PromptOverrides::default(),
        }];
        AgentRegistry::load(AgentsConfig { agents }).unwrap()
    }

    #[test]
    fn test_lists_one_schema_resource_per_agent() {
        let resources = list_resources(&registry());
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].uri, DATASOURCES_URI);
        assert_eq!(resources[1].uri, "schema://sales");
    }

    #[test]
    fn test_read_schema_resource() {
        let text = read_resource(&registry(), "schema://sales").unwrap();
        assert!(text.contains("CREATE TABLE customers"));
    }

    #[test]
    fn test_unknown_uri_is_none() {
        assert!(read_resource(&registry(), "schema://nope").is_none());
        assert!(read_resource(&registry(), "docs://help").is_none());
    }
}
