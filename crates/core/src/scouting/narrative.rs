//! Permanent cache of generated recommendation narratives

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::recommendation::{NarrativeContext, RecommendationKey};
use crate::ports::{NarrativeGenerator, PortResult, RecommendationStore};

/// Lookup-or-generate over the recommendation store.
///
/// A successful generation is stored forever. A failed or blank generation
/// returns the rule-based reason and leaves the key empty, so the next run
/// retries. The lookup and the store are separate calls; two concurrent runs
/// on one key may both generate, and the later write wins.
pub struct ExplanationCache {
    store: Arc<dyn RecommendationStore>,
    generator: Arc<dyn NarrativeGenerator>,
}

impl ExplanationCache {
    pub fn new(store: Arc<dyn RecommendationStore>, generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn get_or_generate(
        &self,
        key: &RecommendationKey,
        context: &NarrativeContext,
    ) -> PortResult<String> {
        if let Some(cached) = self.store.find_narrative(key).await? {
            if !cached.trim().is_empty() {
                debug!(
                    event_name = "scouting.narrative.cache_hit",
                    team_id = %key.team_id,
                    player_id = %key.player_id,
                    season = %key.season,
                    "narrative served from cache"
                );
                return Ok(cached);
            }
        }

        match self.generator.generate(context).await {
            Ok(text) if !text.trim().is_empty() => {
                self.store.store_narrative(key, &text).await?;
                debug!(
                    event_name = "scouting.narrative.generated",
                    team_id = %key.team_id,
                    player_id = %key.player_id,
                    season = %key.season,
                    "narrative generated and cached"
                );
                Ok(text)
            }
            Ok(_) => {
                warn!(
                    event_name = "scouting.narrative.degraded",
                    team_id = %key.team_id,
                    player_id = %key.player_id,
                    season = %key.season,
                    "generator returned blank text; using rule reason"
                );
                Ok(context.rule_reason.clone())
            }
            Err(error) => {
                warn!(
                    event_name = "scouting.narrative.degraded",
                    team_id = %key.team_id,
                    player_id = %key.player_id,
                    season = %key.season,
                    error = %error,
                    "narrative generation failed; using rule reason"
                );
                Ok(context.rule_reason.clone())
            }
        }
    }
}
