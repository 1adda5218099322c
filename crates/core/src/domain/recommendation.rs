use serde::{Deserialize, Serialize};

use crate::domain::player::{PlayerId, Position, Season, TeamId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecommendationKey {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub season: Season,
}

impl RecommendationKey {
    pub fn new(team_id: TeamId, player_id: PlayerId, season: Season) -> Self {
        Self { team_id, player_id, season }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub key: RecommendationKey,
    pub position: Position,
    /// Immediate value.
    pub score: f64,
    pub potential_score: f64,
    /// Rule-based trait summary.
    pub reason: String,
    pub narrative: Option<String>,
}

/// Input handed to the narrative generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub team_name: String,
    pub player_name: String,
    pub position: String,
    pub score: f64,
    pub potential_score: f64,
    pub rule_reason: String,
}

/// A stored recommendation joined with player details for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    pub player_id: PlayerId,
    pub player_name: String,
    pub age: Option<u32>,
    pub position: String,
    pub score: f64,
    pub potential_score: f64,
    pub reason: String,
    pub narrative: Option<String>,
}
