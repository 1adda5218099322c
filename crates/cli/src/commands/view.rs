use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::domain::player::{Season, TeamId};

use crate::commands::{build_engine, execute, open_store, CommandFailure, CommandResult};

/// `limit` falls back to `scouting.view_limit`.
pub fn run(
    options: &LoadOptions,
    team_id: TeamId,
    season: Season,
    limit: Option<u32>,
) -> CommandResult {
    execute("view", options, |config| view(config, team_id, season, limit))
}

async fn view(
    config: AppConfig,
    team_id: TeamId,
    season: Season,
    limit: Option<u32>,
) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    let engine = build_engine(&config, &pool)?;

    let limit = limit.unwrap_or(config.scouting.view_limit);
    let rows = engine.top_recommendations(team_id, season, limit).await?;
    pool.close().await;

    Ok(CommandResult::report("view", &rows))
}
