//! Scouting recommendation engine
//!
//! Aggregates match records into season totals, reads a target team's squad
//! shape, and scores every player from other teams against it. Rule-based
//! reasons can be elaborated into cached narratives.

mod aggregate;
mod bonus;
mod engine;
mod narrative;
mod scoring;
mod team_summary;

pub use aggregate::SeasonStatAggregator;
pub use bonus::PositionBonusCalculator;
pub use engine::{BatchSummary, RecommendationEngine, RecommendationRun};
pub use narrative::ExplanationCache;
pub use scoring::{ScoreBreakdown, ScoreCalculator, ScoringWeights};
pub use team_summary::{
    position_priority, PositionStatRow, TeamSummary, TeamSummaryAnalyzer,
};

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    appearance: 0.4,
    minutes_per_match: 0.3,
    rating: 0.3,
    weak_position_boost: 1.3,
    filled_position_penalty: 0.7,
    young_for_aging_team_boost: 1.1,
    veteran_penalty: 0.9,
    aging_team_potential_boost: 1.2,
};

/// Team average age at or above which the squad counts as aging.
pub const AGING_TEAM_AVG_AGE: f64 = 27.5;

/// Oldest age treated as young when the target team is aging.
pub const YOUNG_PLAYER_MAX_AGE: u32 = 24;

/// Youngest age that takes the veteran penalty.
pub const VETERAN_MIN_AGE: u32 = 29;

/// Candidates per run that get a narrative by default.
pub const DEFAULT_NARRATIVE_TOP_N: usize = 10;

/// Rows returned by the recommendation view by default.
pub const DEFAULT_VIEW_LIMIT: u32 = 10;

/// Reason used when no trait threshold is crossed.
pub const BALANCED_PLAYER_REASON: &str = "balanced player";
