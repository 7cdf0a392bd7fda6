//! Prompt Builder
//!
//! Assembles the final instruction block for one agent and one request.
//! Layering order is fixed: date context, base template (operator override
//! or default), dialect guidance, family addendum. Each layer may be empty
//! but the order never changes.

use crate::date::date_context;
use crate::defaults::{
    COSMOS_PROMPT_ADDENDUM, DEFAULT_GENERAL_CHAT_PROMPT, DEFAULT_INTENT_PROMPT,
    DEFAULT_RESPONSE_PROMPT, DEFAULT_SQL_PROMPT,
};
use crate::dialects::guidelines;
use crate::template::render;
use chrono::NaiveDate;
use dataq_core::AgentConfig;
use tracing::debug;

/// Per-request prompt assembly context.
///
/// Borrows the resolved agent config for the duration of one request;
/// constructed fresh per request and discarded afterwards.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub agent: &'a AgentConfig,
    pub question: &'a str,
    pub today: NaiveDate,
}

impl<'a> PromptContext<'a> {
    pub fn new(agent: &'a AgentConfig, question: &'a str, today: NaiveDate) -> Self {
        Self {
            agent,
            question,
            today,
        }
    }

    /// Build the complete generation prompt.
    pub fn system_prompt(&self) -> String {
        let agent = self.agent;
        let mut sections: Vec<String> = Vec::with_capacity(4);

        sections.push(date_context(self.today));

        let base = agent
            .prompts
            .system
            .as_deref()
            .unwrap_or(DEFAULT_SQL_PROMPT)
            .trim();
        let vars = [
            (
                "schema_context",
                agent.schema_context.as_deref().unwrap_or(""),
            ),
            (
                "few_shot_examples",
                agent.few_shot_examples.as_deref().unwrap_or(""),
            ),
        ];
        sections.push(render(base, &vars).trim().to_string());

        sections.push(guidelines(agent.datasource.kind).trim().to_string());

        if agent.datasource.kind.requires_partition_key() {
            let partition_key = agent
                .datasource
                .connection
                .partition_key
                .as_deref()
                .unwrap_or("/id");
            sections.push(
                render(COSMOS_PROMPT_ADDENDUM, &[("partition_key", partition_key)])
                    .trim()
                    .to_string(),
            );
        }

        let prompt = sections.join("\n\n");
        debug!(
            agent = %agent.name,
            datasource = %agent.datasource.kind,
            chars = prompt.len(),
            "Built system prompt"
        );
        prompt
    }

    /// The response-composition prompt: per-agent override or the default.
    pub fn response_prompt(&self) -> String {
        self.agent
            .prompts
            .response
            .as_deref()
            .unwrap_or(DEFAULT_RESPONSE_PROMPT)
            .trim()
            .to_string()
    }
}

/// Render the routing classification prompt from (name, description) pairs.
pub fn intent_prompt<'a>(catalog: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    render(
        DEFAULT_INTENT_PROMPT,
        &[("agent_descriptions", &describe_agents(catalog))],
    )
}

/// Render the general-chat prompt from (name, description) pairs.
pub fn general_chat_prompt<'a>(catalog: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    render(
        DEFAULT_GENERAL_CHAT_PROMPT,
        &[("agent_descriptions", &describe_agents(catalog))],
    )
}

fn describe_agents<'a>(catalog: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    catalog
        .into_iter()
        .map(|(name, description)| format!("- {name}: {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataq_core::{ConnectionDescriptor, DatasourceKind, DatasourceSpec, PromptOverrides};

    fn agent(kind: DatasourceKind) -> AgentConfig {
        AgentConfig {
            name: "sales".into(),
            description: "Retail sales data".into(),
            datasource: DatasourceSpec {
                kind,
                connection: ConnectionDescriptor::default(),
            },
            schema_context: Some("CREATE TABLE customers (id int, name text)".into()),
            few_shot_examples: Some("Q: how many customers?\nA: SELECT COUNT(*) FROM customers".into()),
            prompts: PromptOverrides::default(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 21).unwrap()
    }

    #[test]
    fn test_layering_order_is_fixed() {
        let agent = agent(DatasourceKind::Postgres);
        let prompt = PromptContext::new(&agent, "q", today()).system_prompt();

        let date_pos = prompt.find("Current date:").unwrap();
        let base_pos = prompt.find("You are a SQL expert").unwrap();
        let dialect_pos = prompt.find("## PostgreSQL Guidelines").unwrap();
        assert!(date_pos < base_pos);
        assert!(base_pos < dialect_pos);
    }

    #[test]
    fn test_schema_and_examples_injected() {
        let agent = agent(DatasourceKind::Postgres);
        let prompt = PromptContext::new(&agent, "q", today()).system_prompt();
        assert!(prompt.contains("CREATE TABLE customers"));
        assert!(prompt.contains("SELECT COUNT(*) FROM customers"));
        assert!(!prompt.contains("{schema_context}"));
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let agent = agent(DatasourceKind::BigQuery);
        let ctx = PromptContext::new(&agent, "q", today());
        assert_eq!(ctx.system_prompt(), ctx.system_prompt());
    }

    #[test]
    fn test_cosmos_addendum_after_dialect_with_partition_key() {
        let mut agent = agent(DatasourceKind::Cosmos);
        agent.datasource.connection.partition_key = Some("/storeId".into());
        let prompt = PromptContext::new(&agent, "q", today()).system_prompt();

        let dialect_pos = prompt.find("## Azure Cosmos DB SQL Guidelines").unwrap();
        let addendum_pos = prompt.find("Key Cosmos DB constraints").unwrap();
        assert!(dialect_pos < addendum_pos);
        assert!(prompt.contains("(/storeId)"));
    }

    #[test]
    fn test_addendum_absent_for_relational_agents() {
        let agent = agent(DatasourceKind::AzureSql);
        let prompt = PromptContext::new(&agent, "q", today()).system_prompt();
        assert!(!prompt.contains("Key Cosmos DB constraints"));
    }

    #[test]
    fn test_custom_override_with_missing_placeholders_tolerated() {
        let mut agent = agent(DatasourceKind::Postgres);
        agent.prompts.system = Some("Answer tersely. {nonexistent_section}".into());
        let prompt = PromptContext::new(&agent, "q", today()).system_prompt();
        assert!(prompt.contains("Answer tersely."));
        assert!(!prompt.contains("{nonexistent_section}"));
    }

    #[test]
    fn test_response_prompt_override() {
        let mut agent = agent(DatasourceKind::Postgres);
        let ctx_default = PromptContext::new(&agent, "q", today());
        assert!(ctx_default.response_prompt().contains("data analyst"));

        agent.prompts.response = Some("Always answer in French.".into());
        let ctx = PromptContext::new(&agent, "q", today());
        assert_eq!(ctx.response_prompt(), "Always answer in French.");
    }

    #[test]
    fn test_intent_prompt_lists_agents() {
        let prompt = intent_prompt([("hr", "Employee records"), ("sales", "Revenue")]);
        assert!(prompt.contains("- hr: Employee records"));
        assert!(prompt.contains("- sales: Revenue"));
        assert!(prompt.contains("general_chat"));
    }
}
