use std::sync::Arc;

use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::domain::player::Season;
use scoutbook_core::scouting::SeasonStatAggregator;
use scoutbook_db::SqlSeasonStatRepository;

use crate::commands::{execute, open_store, CommandFailure, CommandResult};

pub fn run(options: &LoadOptions, season: Season) -> CommandResult {
    execute("aggregate", options, |config| aggregate(config, season))
}

async fn aggregate(config: AppConfig, season: Season) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    let repository = Arc::new(SqlSeasonStatRepository::new(pool.clone()));

    let written =
        SeasonStatAggregator::new(repository.clone(), repository).recompute_season(season).await?;
    pool.close().await;

    Ok(CommandResult::success(
        "aggregate",
        format!("recomputed {written} season aggregate(s) for season {season}"),
    ))
}
