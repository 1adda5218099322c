use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::domain::player::Season;

use crate::commands::{build_engine, execute, open_store, CommandFailure, CommandResult};

pub fn run(options: &LoadOptions, season: Season) -> CommandResult {
    execute("batch", options, |config| batch(config, season))
}

async fn batch(config: AppConfig, season: Season) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    let engine = build_engine(&config, &pool)?;

    let summary = engine.run_recommendation_batch(season).await?;
    pool.close().await;

    Ok(CommandResult::report("batch", &summary))
}
