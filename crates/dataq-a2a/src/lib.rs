//! dataq-a2a: A2A protocol front-end
//!
//! Serves the agent card at `/.well-known/agent-card.json` and a JSON-RPC
//! endpoint supporting `message/send` and `tasks/get`. Like the MCP
//! front-end, this is a thin wire adapter over the shared dispatcher.

pub mod card;
pub mod executor;
pub mod server;
pub mod types;

pub use card::build_agent_card;
pub use executor::{InMemoryTaskStore, TaskExecutor};
pub use server::A2aServer;
pub use types::{AgentCard, AgentSkill, Message, Task, TaskState};
