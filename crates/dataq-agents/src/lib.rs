//! dataq-agents: the routing-and-composition core
//!
//! Holds the immutable agent catalog, decides which agent answers a
//! question, assembles the per-request prompt, delegates execution to the
//! family adapter, and composes the final answer. Both protocol front-ends
//! are thin callers of [`Dispatcher::handle`].

pub mod dispatcher;
pub mod registry;
pub mod response;
pub mod router;

pub use dispatcher::{Dispatcher, QueryRequest, QueryResponse};
pub use registry::{AgentRegistry, RegistryHandle};
pub use router::IntentRouter;
