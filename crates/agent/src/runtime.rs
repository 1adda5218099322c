use std::sync::Arc;

use async_trait::async_trait;
use scoutbook_core::domain::recommendation::NarrativeContext;
use scoutbook_core::errors::ApplicationError;
use scoutbook_core::ports::{NarrativeGenerator, PortResult};
use tracing::{debug, warn};

use crate::guardrails::{GuardrailDecision, GuardrailPolicy};
use crate::llm::LlmClient;
use crate::prompt::recommendation_prompt;

/// Narrative port backed by an LLM. Client failures and denied output both
/// surface as integration errors so the caller keeps the rule reason.
pub struct LlmNarrativeGenerator {
    client: Arc<dyn LlmClient>,
    guardrails: GuardrailPolicy,
}

impl LlmNarrativeGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client, guardrails: GuardrailPolicy::default() }
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(&self, context: &NarrativeContext) -> PortResult<String> {
        let prompt = recommendation_prompt(context);
        let raw = self.client.complete(&prompt).await.map_err(|error| {
            warn!(
                event_name = "agent.narrative.llm_failed",
                player = %context.player_name,
                error = %error,
                "narrative generation failed"
            );
            ApplicationError::Integration(format!("{error:#}"))
        })?;

        match self.guardrails.evaluate(&raw) {
            GuardrailDecision::Allow(text) => {
                debug!(
                    event_name = "agent.narrative.generated",
                    player = %context.player_name,
                    chars = text.len(),
                    "narrative generated"
                );
                Ok(text)
            }
            GuardrailDecision::Deny { reason_code } => {
                warn!(
                    event_name = "agent.narrative.denied",
                    player = %context.player_name,
                    reason_code,
                    "narrative rejected by output guardrail"
                );
                Err(ApplicationError::Integration(format!("narrative rejected: {reason_code}")))
            }
        }
    }
}
