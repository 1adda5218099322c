use std::collections::BTreeMap;
use std::sync::Arc;

use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::domain::player::{Position, Season, TeamId};
use scoutbook_core::domain::season_stat::SeasonStat;
use scoutbook_core::errors::ApplicationError;
use scoutbook_core::ports::TeamDirectory;
use scoutbook_core::scouting::{PositionStatRow, TeamSummary, TeamSummaryAnalyzer};
use scoutbook_db::{SqlPlayerRepository, SqlSeasonStatRepository};
use serde::Serialize;

use crate::commands::{execute, open_store, CommandFailure, CommandResult};

#[derive(Debug, Serialize)]
struct TeamAnalysis {
    team_id: TeamId,
    summary: TeamSummary,
    position_priorities: BTreeMap<Position, f64>,
}

#[derive(Debug, Serialize)]
struct SeasonAnalysis {
    season: Season,
    league_avg_rating: f64,
    teams: Vec<TeamAnalysis>,
    positions: Vec<PositionStatRow>,
}

pub fn run(options: &LoadOptions, season: Season) -> CommandResult {
    execute("analyze", options, |config| analyze(config, season))
}

async fn analyze(config: AppConfig, season: Season) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    let stats = Arc::new(SqlSeasonStatRepository::new(pool.clone()));
    let players = Arc::new(SqlPlayerRepository::new(pool.clone()));

    let rows = stats.list_season_stats(season).await.map_err(ApplicationError::from)?;
    let league_avg_rating = league_avg_rating(&rows);
    let analyzer = TeamSummaryAnalyzer::new(stats.clone(), players.clone());

    let mut teams = Vec::new();
    for team_id in players.list_team_ids(season).await? {
        let summary = analyzer.summarize(team_id, season).await?;
        let position_priorities = summary.position_priorities(league_avg_rating);
        teams.push(TeamAnalysis { team_id, summary, position_priorities });
    }
    pool.close().await;

    let analysis = SeasonAnalysis {
        season,
        league_avg_rating,
        teams,
        positions: TeamSummaryAnalyzer::position_stat_report(&rows),
    };
    Ok(CommandResult::report("analyze", &analysis))
}

/// Mean of the rated players' season ratings; zero when nobody is rated.
fn league_avg_rating(rows: &[SeasonStat]) -> f64 {
    let rated: Vec<f64> =
        rows.iter().filter_map(|row| row.avg_rating.filter(|rating| rating.is_finite())).collect();
    if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    }
}
