//! dataq-prompts: dialect guidance and prompt assembly
//!
//! Pure functions only. Everything here is a deterministic function of its
//! inputs - no clock reads, no I/O - so a prompt built twice from the same
//! agent, question and date is byte-identical.

pub mod builder;
pub mod date;
pub mod defaults;
pub mod dialects;
pub mod sql;
pub mod template;

pub use builder::{general_chat_prompt, intent_prompt, PromptContext};
pub use date::date_context;
pub use dialects::{guidelines, guidelines_for};
pub use sql::clean_sql_query;
pub use template::render;
