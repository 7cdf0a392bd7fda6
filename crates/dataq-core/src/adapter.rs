//! Datasource adapter seam.
//!
//! The dispatcher never speaks any wire protocol to a database. It hands a
//! family adapter the final generation prompt, the question, and the opaque
//! connection descriptor, and gets back rows or a typed execution error.

use crate::config::ConnectionDescriptor;
use crate::error::{Error, Result};
use crate::types::{DatasourceKind, ExecutionOutput};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Adapter for one datasource family - implement this to plug in a backend.
///
/// Failures must be reported as `Error::Execution` with the sub-kind set:
/// `InvalidQuery` when the generated query was rejected, `Transport` when the
/// connection itself failed. Retries are the adapter's business; the
/// dispatcher never retries on its own.
#[async_trait]
pub trait DatasourceAdapter: Send + Sync {
    async fn execute(
        &self,
        prompt: &str,
        question: &str,
        connection: &ConnectionDescriptor,
    ) -> Result<ExecutionOutput>;
}

/// Per-family adapter registry, assembled once at startup.
#[derive(Default, Clone)]
pub struct AdapterSet {
    adapters: HashMap<DatasourceKind, Arc<dyn DatasourceAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: DatasourceKind, adapter: Arc<dyn DatasourceAdapter>) {
        self.adapters.insert(kind, adapter);
    }

    /// Register one adapter for every known family.
    pub fn register_all(&mut self, adapter: Arc<dyn DatasourceAdapter>) {
        for kind in DatasourceKind::ALL {
            self.adapters.insert(*kind, adapter.clone());
        }
    }

    pub fn get(&self, kind: DatasourceKind) -> Result<Arc<dyn DatasourceAdapter>> {
        self.adapters.get(&kind).cloned().ok_or_else(|| {
            Error::configuration(format!("no adapter registered for datasource type {kind}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullAdapter;

    #[async_trait]
    impl DatasourceAdapter for NullAdapter {
        async fn execute(
            &self,
            _prompt: &str,
            _question: &str,
            _connection: &ConnectionDescriptor,
        ) -> Result<ExecutionOutput> {
            Ok(ExecutionOutput::default())
        }
    }

    #[test]
    fn test_missing_adapter_is_configuration_error() {
        let set = AdapterSet::new();
        let err = set.get(DatasourceKind::Postgres).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_register_all_covers_every_kind() {
        let mut set = AdapterSet::new();
        set.register_all(Arc::new(NullAdapter));
        for kind in DatasourceKind::ALL {
            assert!(set.get(*kind).is_ok());
        }
    }
}
