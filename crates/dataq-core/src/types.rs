//! Core value types: datasource kinds, routing decisions, execution output.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Datasource families the platform knows how to prompt for.
///
/// Parsing is case-insensitive and alias-resolving, so operator config may
/// say `postgresql`, `mssql` or `cosmosdb` and land on the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DatasourceKind {
    Postgres,
    AzureSql,
    Synapse,
    Cosmos,
    Databricks,
    BigQuery,
}

impl DatasourceKind {
    /// All known families, in stable order.
    pub const ALL: &'static [DatasourceKind] = &[
        DatasourceKind::Postgres,
        DatasourceKind::AzureSql,
        DatasourceKind::Synapse,
        DatasourceKind::Cosmos,
        DatasourceKind::Databricks,
        DatasourceKind::BigQuery,
    ];

    /// Whether generated queries must be constrained to a partition key.
    pub fn requires_partition_key(&self) -> bool {
        matches!(self, DatasourceKind::Cosmos)
    }

    /// Whether this family stores documents rather than rows.
    pub fn is_document_store(&self) -> bool {
        matches!(self, DatasourceKind::Cosmos)
    }
}

impl fmt::Display for DatasourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasourceKind::Postgres => write!(f, "postgres"),
            DatasourceKind::AzureSql => write!(f, "azure_sql"),
            DatasourceKind::Synapse => write!(f, "synapse"),
            DatasourceKind::Cosmos => write!(f, "cosmos"),
            DatasourceKind::Databricks => write!(f, "databricks"),
            DatasourceKind::BigQuery => write!(f, "bigquery"),
        }
    }
}

impl FromStr for DatasourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatasourceKind::Postgres),
            "azure_sql" | "azuresql" | "mssql" | "sqlserver" => Ok(DatasourceKind::AzureSql),
            "synapse" => Ok(DatasourceKind::Synapse),
            "cosmos" | "cosmosdb" => Ok(DatasourceKind::Cosmos),
            "databricks" => Ok(DatasourceKind::Databricks),
            "bigquery" | "big_query" => Ok(DatasourceKind::BigQuery),
            other => Err(Error::configuration(format!(
                "unknown datasource type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for DatasourceKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DatasourceKind> for String {
    fn from(kind: DatasourceKind) -> Self {
        kind.to_string()
    }
}

/// Outcome of intent classification for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// One registered agent should answer.
    Agent(String),
    /// Greeting / capability chat, no datasource involved.
    GeneralChat,
    /// No agent matched; carries the candidates that were considered.
    NoMatch { candidates: Vec<String> },
}

/// Result handed back by a datasource adapter.
///
/// `rows` is a JSON array of objects for tabular backends, or an array of
/// documents for document stores. Generation-only adapters leave it unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionOutput {
    /// The query the adapter generated and/or executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Value>,
}

impl ExecutionOutput {
    pub fn generated(sql: impl Into<String>) -> Self {
        Self {
            sql: Some(sql.into()),
            rows: None,
        }
    }

    pub fn with_rows(mut self, rows: Value) -> Self {
        self.rows = Some(rows);
        self
    }
}
