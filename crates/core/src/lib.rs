pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod scouting;

pub use domain::player::{Player, PlayerId, Position, Season, Team, TeamId};
pub use domain::recommendation::{
    NarrativeContext, Recommendation, RecommendationKey, RecommendationView,
};
pub use domain::season_stat::{CategoryStats, MatchRecord, SeasonAggregate, SeasonStat};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ports::{
    NarrativeGenerator, PlayerDirectory, PortResult, RecommendationStore, SeasonStatStore,
    StatSource, TeamDirectory,
};
pub use scouting::{
    BatchSummary, ExplanationCache, PositionStatRow, RecommendationEngine, RecommendationRun,
    ScoreCalculator, SeasonStatAggregator, TeamSummary, TeamSummaryAnalyzer,
};
