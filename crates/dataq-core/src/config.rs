//! Agent configuration model and loader.
//!
//! Agents are declared in YAML, one file or a directory of files, and merged
//! with environment-variable overrides before validation. Environment wins
//! field by field, so a checked-in config can omit secrets:
//!
//! ```yaml
//! agents:
//!   - name: sales
//!     description: Retail sales and revenue figures
//!     datasource:
//!       kind: postgres
//!       connection:
//!         host: db.internal
//!         database: sales
//!         username: reader
//! ```
//!
//! with `DATAQ_AGENT_SALES_PASSWORD` supplying the credential at runtime.

use crate::error::{Error, Result};
use crate::types::DatasourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// One configured datasource agent. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique, stable identifier.
    pub name: String,
    /// Human-readable description; this is what the intent router sees.
    #[serde(default)]
    pub description: String,
    pub datasource: DatasourceSpec,
    /// Schema text injected into the generation prompt.
    #[serde(default)]
    pub schema_context: Option<String>,
    /// Pre-formatted few-shot examples, if the operator supplies any.
    #[serde(default)]
    pub few_shot_examples: Option<String>,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

/// Datasource family plus its opaque connection descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasourceSpec {
    #[serde(alias = "type")]
    pub kind: DatasourceKind,
    #[serde(default)]
    pub connection: ConnectionDescriptor,
}

/// Operator overrides for the default prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOverrides {
    /// Replaces the default generation template. May use the
    /// `{schema_context}` and `{few_shot_examples}` placeholders.
    #[serde(default)]
    pub system: Option<String>,
    /// Replaces the default response-composition template.
    #[serde(default)]
    pub response: Option<String>,
}

/// Connection settings, passed through to the family adapter untouched.
///
/// The core only ever reads `partition_key` (Cosmos prompt addendum) and the
/// credential fields checked at load time; everything else, including the
/// flattened `extra` map, is adapter territory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Full connection string; when present it supersedes the field-wise
    /// settings and lifts the password requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    /// Use Entra ID / federated auth instead of a password.
    #[serde(default)]
    pub use_aad: bool,
    /// Document container name (Cosmos).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Partition key path (Cosmos), e.g. `/storeId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Root of the agents configuration file(s).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

impl AgentsConfig {
    /// Load a single YAML file and apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: AgentsConfig = serde_yaml::from_str(&text)
            .map_err(|e| Error::configuration(format!("{}: {e}", path.display())))?;
        config.apply_env_overrides();
        debug!(path = %path.display(), agents = config.agents.len(), "Loaded agent config");
        Ok(config)
    }

    /// Load and merge every `*.yaml`/`*.yml` file in a directory, sorted by
    /// file name so merge order is deterministic.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(Error::configuration(format!(
                "no agent config files in {}",
                dir.display()
            )));
        }

        let mut merged = AgentsConfig::default();
        for path in paths {
            let config = Self::load(&path)?;
            merged.agents.extend(config.agents);
        }
        Ok(merged)
    }

    /// Load from a path that may be a file or a directory.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::load(path)
        }
    }

    /// Overlay `DATAQ_AGENT_<NAME>_<FIELD>` environment variables on top of
    /// file values, field by field.
    pub fn apply_env_overrides(&mut self) {
        for agent in &mut self.agents {
            agent.apply_env_overrides();
        }
    }
}

impl AgentConfig {
    fn apply_env_overrides(&mut self) {
        let conn = &mut self.datasource.connection;
        for (field, slot) in [
            ("HOST", &mut conn.host),
            ("DATABASE", &mut conn.database),
            ("USERNAME", &mut conn.username),
            ("PASSWORD", &mut conn.password),
            ("CONNECTION_STRING", &mut conn.connection_string),
            ("CONTAINER", &mut conn.container),
            ("PARTITION_KEY", &mut conn.partition_key),
        ] {
            let key = env_key(&self.name, field);
            if let Ok(value) = std::env::var(&key) {
                if !value.is_empty() {
                    debug!(key = %key, "Applying environment override");
                    *slot = Some(value);
                }
            }
        }

        if let Ok(value) = std::env::var(env_key(&self.name, "PORT")) {
            match value.parse() {
                Ok(port) => conn.port = Some(port),
                Err(_) => warn!(agent = %self.name, value = %value, "Ignoring non-numeric port override"),
            }
        }
        if let Ok(value) = std::env::var(env_key(&self.name, "USE_AAD")) {
            conn.use_aad = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Check that the declared auth mode has the fields it needs.
    ///
    /// Password-style families need a password unless AAD is enabled or a
    /// full connection string is supplied. BigQuery authenticates through
    /// ambient application credentials and is exempt.
    pub fn validate_credentials(&self) -> Result<()> {
        let conn = &self.datasource.connection;
        if conn.connection_string.is_some() || conn.use_aad {
            return Ok(());
        }
        match self.datasource.kind {
            DatasourceKind::Postgres
            | DatasourceKind::AzureSql
            | DatasourceKind::Synapse
            | DatasourceKind::Databricks => {
                if conn.password.is_none() {
                    return Err(Error::configuration(format!(
                        "agent '{}': {} requires a password, a connection string, or use_aad",
                        self.name, self.datasource.kind
                    )));
                }
            }
            DatasourceKind::Cosmos => {
                if conn.password.is_none() {
                    return Err(Error::configuration(format!(
                        "agent '{}': cosmos requires an account key, a connection string, or use_aad",
                        self.name
                    )));
                }
            }
            DatasourceKind::BigQuery => {}
        }
        Ok(())
    }
}

fn env_key(name: &str, field: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("DATAQ_AGENT_{name}_{field}")
}
