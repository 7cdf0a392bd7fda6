//! Intent Router
//!
//! Picks the one agent that should answer a question. The classification
//! itself is delegated to the LLM with a routing prompt built fresh from the
//! registry snapshot; this module owns the routing contract around it:
//! skip the classifier when there is no real choice, and fail closed to
//! general chat when the classifier names a target that does not exist.

use crate::registry::AgentRegistry;
use dataq_core::{Error, Result, RoutingDecision};
use dataq_llm::LlmClient;
use dataq_prompts::intent_prompt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker the classifier returns for conversational questions.
pub const GENERAL_CHAT_MARKER: &str = "general_chat";
/// Marker the classifier returns when no agent fits.
pub const NO_MATCH_MARKER: &str = "unknown";

pub struct IntentRouter {
    llm: Arc<dyn LlmClient>,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Classify `question` against the registry snapshot.
    ///
    /// With exactly one registered agent the classifier is never invoked.
    /// A classifier answer naming an unregistered agent degrades to
    /// `GeneralChat`; it must never reach the dispatcher as a target.
    pub async fn route(
        &self,
        question: &str,
        registry: &AgentRegistry,
    ) -> Result<RoutingDecision> {
        if registry.len() == 1 {
            let name = registry
                .names()
                .pop()
                .ok_or_else(|| Error::internal("registry reported one agent but listed none"))?;
            debug!(agent = %name, "Single agent registered, routing without classification");
            return Ok(RoutingDecision::Agent(name));
        }

        let catalog = registry.catalog();
        let prompt = intent_prompt(
            catalog
                .iter()
                .map(|(name, description)| (name.as_str(), description.as_str())),
        );

        let raw = self
            .llm
            .complete(&prompt, question)
            .await
            .map_err(|e| Error::routing(format!("classification call failed: {e}")))?;
        let answer = normalize_answer(&raw);

        debug!(answer = %answer, "Classifier answered");

        if answer.eq_ignore_ascii_case(GENERAL_CHAT_MARKER) {
            return Ok(RoutingDecision::GeneralChat);
        }
        if answer.eq_ignore_ascii_case(NO_MATCH_MARKER) {
            return Ok(RoutingDecision::NoMatch {
                candidates: registry.names(),
            });
        }
        if registry.contains(&answer) {
            info!(agent = %answer, "Routed question");
            return Ok(RoutingDecision::Agent(answer));
        }

        warn!(
            answer = %answer,
            "Classifier named an unregistered agent, degrading to general chat"
        );
        Ok(RoutingDecision::GeneralChat)
    }
}

/// Strip quoting and trailing punctuation the model tends to add.
fn normalize_answer(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '.' | ':'))
        .trim()
        .to_string()
}
