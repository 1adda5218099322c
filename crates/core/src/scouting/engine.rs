//! Recommendation runs for one team or a whole season

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::narrative::ExplanationCache;
use super::scoring::ScoreCalculator;
use super::team_summary::{TeamSummary, TeamSummaryAnalyzer};
use super::DEFAULT_NARRATIVE_TOP_N;
use crate::domain::player::{Season, TeamId};
use crate::domain::recommendation::{
    NarrativeContext, Recommendation, RecommendationKey, RecommendationView,
};
use crate::errors::DomainError;
use crate::ports::{
    NarrativeGenerator, PlayerDirectory, PortResult, RecommendationStore, StatSource,
    TeamDirectory,
};

/// Outcome of scoring one target team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRun {
    pub team_id: TeamId,
    pub season: Season,
    pub summary: TeamSummary,
    /// Sorted by score descending, ties by player id.
    pub recommendations: Vec<Recommendation>,
    pub narratives_attached: usize,
}

impl RecommendationRun {
    pub fn candidates_scored(&self) -> usize {
        self.recommendations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub season: Season,
    pub teams_processed: usize,
    pub recommendations_written: usize,
}

pub struct RecommendationEngine {
    stats: Arc<dyn StatSource>,
    players: Arc<dyn PlayerDirectory>,
    teams: Arc<dyn TeamDirectory>,
    store: Arc<dyn RecommendationStore>,
    narratives: Option<ExplanationCache>,
    calculator: ScoreCalculator,
    narrative_top_n: usize,
}

impl RecommendationEngine {
    pub fn new(
        stats: Arc<dyn StatSource>,
        players: Arc<dyn PlayerDirectory>,
        teams: Arc<dyn TeamDirectory>,
        store: Arc<dyn RecommendationStore>,
    ) -> Self {
        Self {
            stats,
            players,
            teams,
            store,
            narratives: None,
            calculator: ScoreCalculator::new(),
            narrative_top_n: DEFAULT_NARRATIVE_TOP_N,
        }
    }

    pub fn with_narratives(mut self, generator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narratives = Some(ExplanationCache::new(self.store.clone(), generator));
        self
    }

    /// Zero disables narrative enrichment.
    pub fn with_narrative_top_n(mut self, top_n: usize) -> Self {
        self.narrative_top_n = top_n;
        self
    }

    /// Scores every player of the other teams against `team_id` and upserts
    /// one recommendation per candidate. A storage failure aborts the run;
    /// rows written before the failure stay written.
    pub async fn recommend_players(
        &self,
        team_id: TeamId,
        season: Season,
    ) -> PortResult<RecommendationRun> {
        let analyzer = TeamSummaryAnalyzer::new(self.stats.clone(), self.players.clone());
        let summary = analyzer.summarize(team_id, season).await?;
        let candidates = self.stats.list_candidate_stats(season, team_id).await?;

        let mut recommendations = Vec::with_capacity(candidates.len());
        for stat in &candidates {
            let age = self.players.get_age(stat.player_id).await?.unwrap_or(0);
            let position = stat.normalized_position();
            let breakdown = self.calculator.score_candidate(stat, age, &summary);

            let recommendation = Recommendation {
                key: RecommendationKey::new(team_id, stat.player_id, season),
                reason: self.calculator.generate_reason(&position, &stat.categories),
                position,
                score: breakdown.final_score,
                potential_score: breakdown.potential_score,
                narrative: None,
            };
            self.store.upsert(&recommendation).await?;

            debug!(
                event_name = "scouting.recommend.scored",
                team_id = %team_id,
                season = %season,
                player_id = %stat.player_id,
                score = recommendation.score,
                potential_score = recommendation.potential_score,
                "candidate scored"
            );
            recommendations.push(recommendation);
        }

        recommendations.sort_by(|left, right| {
            right
                .score
                .partial_cmp(&left.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.key.player_id.cmp(&right.key.player_id))
        });

        let narratives_attached = self.attach_narratives(team_id, &mut recommendations).await?;

        info!(
            event_name = "scouting.recommend.completed",
            team_id = %team_id,
            season = %season,
            candidates = recommendations.len(),
            weak_positions = ?summary.weak_positions,
            narratives_attached,
            "recommendation run completed"
        );

        Ok(RecommendationRun { team_id, season, summary, recommendations, narratives_attached })
    }

    async fn attach_narratives(
        &self,
        team_id: TeamId,
        recommendations: &mut [Recommendation],
    ) -> PortResult<usize> {
        let Some(cache) = &self.narratives else {
            return Ok(0);
        };
        if self.narrative_top_n == 0 || recommendations.is_empty() {
            return Ok(0);
        }

        let team_name = self
            .teams
            .get_team_name(team_id)
            .await?
            .unwrap_or_else(|| format!("Team {team_id}"));

        let mut attached = 0;
        for recommendation in recommendations.iter_mut().take(self.narrative_top_n) {
            let player_id = recommendation.key.player_id;
            let player_name = self
                .players
                .get_name(player_id)
                .await?
                .unwrap_or_else(|| format!("Player {player_id}"));
            let context = NarrativeContext {
                team_name: team_name.clone(),
                player_name,
                position: recommendation.position.code().to_string(),
                score: recommendation.score,
                potential_score: recommendation.potential_score,
                rule_reason: recommendation.reason.clone(),
            };

            let text = cache.get_or_generate(&recommendation.key, &context).await?;
            if text != recommendation.reason {
                attached += 1;
            }
            recommendation.narrative = Some(text);
        }
        Ok(attached)
    }

    /// Runs every team of the season in turn. The first failing team aborts
    /// the batch.
    pub async fn run_recommendation_batch(&self, season: Season) -> PortResult<BatchSummary> {
        let team_ids = self.teams.list_team_ids(season).await?;
        let mut summary =
            BatchSummary { season, teams_processed: 0, recommendations_written: 0 };

        for team_id in team_ids {
            let run = match self.recommend_players(team_id, season).await {
                Ok(run) => run,
                Err(error) => {
                    warn!(
                        event_name = "scouting.batch.aborted",
                        team_id = %team_id,
                        season = %season,
                        teams_processed = summary.teams_processed,
                        error = %error,
                        "batch aborted"
                    );
                    return Err(error);
                }
            };
            summary.teams_processed += 1;
            summary.recommendations_written += run.candidates_scored();
        }

        info!(
            event_name = "scouting.batch.completed",
            season = %season,
            teams_processed = summary.teams_processed,
            recommendations_written = summary.recommendations_written,
            "batch completed"
        );
        Ok(summary)
    }

    /// Stored recommendations for a team, best first.
    pub async fn top_recommendations(
        &self,
        team_id: TeamId,
        season: Season,
        limit: u32,
    ) -> PortResult<Vec<RecommendationView>> {
        if limit == 0 {
            return Err(DomainError::InvariantViolation(
                "recommendation view limit must be greater than zero".to_string(),
            )
            .into());
        }
        self.store.list_for_team(team_id, season, limit).await
    }
}
