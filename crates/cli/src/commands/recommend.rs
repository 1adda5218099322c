use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::domain::player::{Season, TeamId};

use crate::commands::{build_engine, execute, open_store, CommandFailure, CommandResult};

pub fn run(options: &LoadOptions, team_id: TeamId, season: Season) -> CommandResult {
    execute("recommend", options, |config| recommend(config, team_id, season))
}

async fn recommend(
    config: AppConfig,
    team_id: TeamId,
    season: Season,
) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    let engine = build_engine(&config, &pool)?;

    let run = engine.recommend_players(team_id, season).await?;
    pool.close().await;

    Ok(CommandResult::report("recommend", &run))
}
