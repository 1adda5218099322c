//! Collaborator contracts consumed by the scouting engine.
//!
//! Storage and text generation live outside this crate. Each trait is kept
//! narrow so tests can swap in an in-memory fake.

use async_trait::async_trait;

use crate::domain::player::{PlayerId, Season, TeamId};
use crate::domain::recommendation::{
    NarrativeContext, Recommendation, RecommendationKey, RecommendationView,
};
use crate::domain::season_stat::{MatchRecord, SeasonAggregate, SeasonStat};
use crate::errors::ApplicationError;

pub type PortResult<T> = Result<T, ApplicationError>;

#[async_trait]
pub trait StatSource: Send + Sync {
    async fn list_match_records(&self, season: Season) -> PortResult<Vec<MatchRecord>>;

    /// Season stats of every team except `exclude_team`.
    async fn list_candidate_stats(
        &self,
        season: Season,
        exclude_team: TeamId,
    ) -> PortResult<Vec<SeasonStat>>;

    async fn list_team_stats(&self, team_id: TeamId, season: Season)
        -> PortResult<Vec<SeasonStat>>;
}

#[async_trait]
pub trait SeasonStatStore: Send + Sync {
    /// Overwrites the appearance/minutes/rating totals for the aggregate's key.
    async fn replace_aggregate(&self, aggregate: &SeasonAggregate) -> PortResult<()>;
}

#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn get_age(&self, player_id: PlayerId) -> PortResult<Option<u32>>;
    async fn get_name(&self, player_id: PlayerId) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn list_team_ids(&self, season: Season) -> PortResult<Vec<TeamId>>;
    async fn get_team_name(&self, team_id: TeamId) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Single upsert by key. Never touches a stored narrative.
    async fn upsert(&self, recommendation: &Recommendation) -> PortResult<()>;
    async fn find_narrative(&self, key: &RecommendationKey) -> PortResult<Option<String>>;
    async fn store_narrative(&self, key: &RecommendationKey, text: &str) -> PortResult<()>;
    async fn list_for_team(
        &self,
        team_id: TeamId,
        season: Season,
        limit: u32,
    ) -> PortResult<Vec<RecommendationView>>;
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, context: &NarrativeContext) -> PortResult<String>;
}
