pub mod aggregate;
pub mod analyze;
pub mod batch;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod recommend;
pub mod seed;
pub mod view;

use std::future::Future;
use std::sync::Arc;

use scoutbook_agent::{client_from_config, LlmNarrativeGenerator};
use scoutbook_core::config::{AppConfig, LoadOptions};
use scoutbook_core::errors::ApplicationError;
use scoutbook_core::scouting::RecommendationEngine;
use scoutbook_db::{
    connect, migrations, DbPool, SqlPlayerRepository, SqlRecommendationRepository,
    SqlSeasonStatRepository,
};
use serde::Serialize;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::logging;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME_INIT: u8 = 3;
pub const EXIT_DB_CONNECTIVITY: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_RUN_FAILURE: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommandReport<'a, T> {
    command: &'a str,
    status: &'static str,
    data: &'a T,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            user_message: None,
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_outcome(payload) }
    }

    /// Successful run with a structured `data` document instead of a message.
    pub fn report<T: Serialize>(command: &str, data: &T) -> Self {
        match serde_json::to_string(&CommandReport { command, status: "ok", data }) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_RUN_FAILURE),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            user_message: None,
            correlation_id: None,
        };
        Self { exit_code, output: serialize_outcome(payload) }
    }

    /// Failure of a command body, tagged with the run's correlation id.
    /// Scouting errors also carry the user-facing message of their
    /// interface mapping.
    fn from_failure(command: &str, correlation_id: &str, failure: CommandFailure) -> Self {
        let (error_class, message, exit_code, user_message, correlation_id) = match failure {
            CommandFailure::Step((error_class, message, exit_code)) => {
                (error_class, message, exit_code, None, correlation_id.to_string())
            }
            CommandFailure::Application(error) => {
                let error_class = error.class();
                let message = error.to_string();
                let interface = error.into_interface(correlation_id);
                (
                    error_class,
                    message,
                    EXIT_RUN_FAILURE,
                    Some(interface.user_message().to_string()),
                    interface.correlation_id().to_string(),
                )
            }
        };

        warn!(
            event_name = "cli.command.failed",
            command,
            correlation_id = %correlation_id,
            error_class,
            message = %message,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message,
            user_message,
            correlation_id: Some(correlation_id),
        };
        Self { exit_code, output: serialize_outcome(payload) }
    }
}

fn serialize_outcome(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Error class, message and exit code of a failed step.
pub(crate) type Failure = (&'static str, String, u8);

/// Error side of a command body; `?` lifts both variants.
#[derive(Debug)]
pub(crate) enum CommandFailure {
    /// Setup or tooling step with its own class and exit code.
    Step(Failure),
    /// Scouting operation failure, reported as a run failure.
    Application(ApplicationError),
}

impl From<Failure> for CommandFailure {
    fn from(failure: Failure) -> Self {
        Self::Step(failure)
    }
}

impl From<ApplicationError> for CommandFailure {
    fn from(error: ApplicationError) -> Self {
        Self::Application(error)
    }
}

/// Loads config, installs logging and drives `body` on a current-thread
/// runtime inside a span carrying a fresh correlation id.
pub(crate) fn execute<F, Fut>(command: &'static str, options: &LoadOptions, body: F) -> CommandResult
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = Result<CommandResult, CommandFailure>>,
{
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };
    logging::init(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME_INIT,
            );
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("command", command, correlation_id = %correlation_id);
    match runtime.block_on(body(config).instrument(span)) {
        Ok(result) => result,
        Err(failure) => CommandResult::from_failure(command, &correlation_id, failure),
    }
}

/// Connects and applies pending migrations so every command sees the schema.
pub(crate) async fn open_store(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    let pool = connect(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;
    Ok(pool)
}

pub(crate) fn build_engine(
    config: &AppConfig,
    pool: &DbPool,
) -> Result<RecommendationEngine, CommandFailure> {
    let stats = Arc::new(SqlSeasonStatRepository::new(pool.clone()));
    let players = Arc::new(SqlPlayerRepository::new(pool.clone()));
    let store = Arc::new(SqlRecommendationRepository::new(pool.clone()));

    let mut engine = RecommendationEngine::new(stats, players.clone(), players, store)
        .with_narrative_top_n(config.scouting.narrative_top_n);

    let client = client_from_config(&config.llm)
        .map_err(|error| ("llm_config", format!("{error:#}"), EXIT_CONFIG))?;
    if let Some(client) = client {
        engine = engine.with_narratives(Arc::new(LlmNarrativeGenerator::new(client)));
    }
    Ok(engine)
}
