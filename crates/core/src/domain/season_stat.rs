use serde::{Deserialize, Serialize};

use crate::domain::player::{PlayerId, Position, Season, TeamId};

/// One player's involvement in one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_id: PlayerId,
    pub season: Season,
    pub minutes_played: u32,
    pub rating: Option<f64>,
}

/// Season totals derived from match records; written back over the stored row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonAggregate {
    pub player_id: PlayerId,
    pub season: Season,
    pub appearances: u32,
    pub total_minutes: u32,
    pub avg_rating: Option<f64>,
}

/// Category counters used by the position bonus. Absent source data is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub key_passes: u32,
    pub pass_accuracy: f64,
    pub tackles: u32,
    pub interceptions: u32,
    pub clearances: u32,
    pub saves: u32,
    pub goals_conceded: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonStat {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub season: Season,
    /// Raw provider label, e.g. "Defender".
    pub position: Option<String>,
    pub appearances: u32,
    pub minutes_played: u32,
    pub avg_rating: Option<f64>,
    pub categories: CategoryStats,
}

impl SeasonStat {
    pub fn normalized_position(&self) -> Position {
        Position::from_raw(self.position.as_deref().unwrap_or_default())
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.avg_rating.filter(|rating| rating.is_finite()).unwrap_or(0.0)
    }
}
