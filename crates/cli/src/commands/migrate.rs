use scoutbook_core::config::{AppConfig, LoadOptions};

use crate::commands::{execute, open_store, CommandFailure, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    execute("migrate", options, migrate)
}

async fn migrate(config: AppConfig) -> Result<CommandResult, CommandFailure> {
    let pool = open_store(&config).await?;
    pool.close().await;
    Ok(CommandResult::success("migrate", "applied pending migrations"))
}
