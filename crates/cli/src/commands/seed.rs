use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_db::DemoLeague;

use crate::commands::{execute, open_store, CommandFailure, CommandResult, EXIT_RUN_FAILURE};

pub fn run(options: &LoadOptions) -> CommandResult {
    execute("seed", options, seed)
}

async fn seed(config: AppConfig) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;

    let seeded = DemoLeague::load(&pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), EXIT_RUN_FAILURE))?;
    let verified = DemoLeague::verify(&pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), EXIT_RUN_FAILURE))?;
    pool.close().await;

    if !verified {
        return Err(CommandFailure::Step((
            "seed_verification",
            "demo league rows are incomplete after load".to_string(),
            EXIT_RUN_FAILURE,
        )));
    }

    Ok(CommandResult::success(
        "seed",
        format!(
            "demo league loaded for season {}: {} teams, {} players, {} match records, {} season stats",
            DemoLeague::SEASON,
            seeded.teams,
            seeded.players,
            seeded.match_records,
            seeded.season_stats
        ),
    ))
}
