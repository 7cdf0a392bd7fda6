//! Error types for dataq

use std::fmt;
use thiserror::Error;

/// Pipeline stage a request was in when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Received,
    Routed,
    Prompted,
    Executed,
    Formatted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Received => write!(f, "received"),
            Stage::Routed => write!(f, "routed"),
            Stage::Prompted => write!(f, "prompted"),
            Stage::Executed => write!(f, "executed"),
            Stage::Formatted => write!(f, "formatted"),
        }
    }
}

/// Sub-kind of an execution failure.
///
/// The caller needs to tell a bad generated query apart from a broken
/// connection: the first is worth regenerating, the second is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionErrorKind {
    InvalidQuery,
    Transport,
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionErrorKind::InvalidQuery => write!(f, "invalid_query"),
            ExecutionErrorKind::Transport => write!(f, "transport"),
        }
    }
}

/// Main error type for dataq operations
#[derive(Error, Debug)]
pub enum Error {
    /// Fatal at load: bad agent configuration, duplicate names, unknown
    /// datasource types, missing credentials.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The routing classifier failed or misbehaved.
    #[error("Routing error: {0}")]
    Routing(String),

    /// A caller asked for an agent that is not in the registry.
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// An override template could not be assembled at all.
    #[error("Prompt build error: {0}")]
    PromptBuild(String),

    /// The datasource adapter failed.
    #[error("Execution error ({kind}): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        message: String,
    },

    /// A caller-supplied deadline expired mid-pipeline.
    #[error("Timed out during stage {stage}")]
    Timeout { stage: Stage },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a routing error
    pub fn routing(msg: impl Into<String>) -> Self {
        Error::Routing(msg.into())
    }

    /// Create an unknown-agent error
    pub fn unknown_agent(name: impl Into<String>) -> Self {
        Error::UnknownAgent(name.into())
    }

    /// Create a prompt build error
    pub fn prompt_build(msg: impl Into<String>) -> Self {
        Error::PromptBuild(msg.into())
    }

    /// Create an execution error for a query the backend rejected
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::Execution {
            kind: ExecutionErrorKind::InvalidQuery,
            message: msg.into(),
        }
    }

    /// Create an execution error for a connection-level failure
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Execution {
            kind: ExecutionErrorKind::Transport,
            message: msg.into(),
        }
    }

    /// Create a timeout error for the given stage
    pub fn timeout(stage: Stage) -> Self {
        Error::Timeout { stage }
    }

    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Configuration(_) => Stage::Received,
            Error::Routing(_) | Error::UnknownAgent(_) => Stage::Routed,
            Error::PromptBuild(_) => Stage::Prompted,
            Error::Execution { .. } => Stage::Executed,
            Error::Timeout { stage } => *stage,
            Error::Serialization(_) => Stage::Formatted,
            Error::Io(_) | Error::Internal(_) => Stage::Received,
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_carries_kind() {
        let err = Error::transport("connection reset");
        match err {
            Error::Execution { kind, .. } => assert_eq!(kind, ExecutionErrorKind::Transport),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_errors_map_to_stages() {
        assert_eq!(Error::routing("x").stage(), Stage::Routed);
        assert_eq!(Error::unknown_agent("hr").stage(), Stage::Routed);
        assert_eq!(Error::invalid_query("x").stage(), Stage::Executed);
        assert_eq!(Error::timeout(Stage::Executed).stage(), Stage::Executed);
        assert_eq!(Error::configuration("x").stage(), Stage::Received);
    }
}
