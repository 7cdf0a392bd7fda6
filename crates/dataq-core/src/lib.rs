//! dataq-core: shared types for the dataq platform
//!
//! Everything the other crates agree on lives here: the error taxonomy,
//! the datasource/agent configuration model, and the adapter seam that
//! separates the routing core from concrete database drivers.

pub mod adapter;
pub mod config;
pub mod env;
pub mod error;
pub mod types;

pub use adapter::{AdapterSet, DatasourceAdapter};
pub use config::{AgentConfig, AgentsConfig, ConnectionDescriptor, DatasourceSpec, PromptOverrides};
pub use env::load_environment;
pub use error::{Error, ExecutionErrorKind, Result, Stage};
pub use types::{DatasourceKind, ExecutionOutput, RoutingDecision};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        AgentConfig, AgentsConfig, ConnectionDescriptor, DatasourceAdapter, DatasourceKind,
        Error, ExecutionErrorKind, ExecutionOutput, Result, RoutingDecision, Stage,
    };
}
