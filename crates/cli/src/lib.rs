pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use scoutbook_core::config::{ConfigOverrides, LlmProvider, LoadOptions};
use scoutbook_core::domain::player::{Season, TeamId};

#[derive(Debug, Parser)]
#[command(
    name = "scoutbook",
    about = "Scoutbook scouting recommendation CLI",
    long_about = "Aggregate season stats, score transfer candidates for a team, and inspect stored recommendations.",
    after_help = "Examples:\n  scoutbook seed\n  scoutbook recommend --team 1 --season 2024\n  scoutbook view --team 1 --season 2024 --limit 5\n  scoutbook doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a scoutbook.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override database.url")]
    database_url: Option<String>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override scouting.narrative_top_n")]
    narrative_top_n: Option<usize>,
    #[arg(long, global = true, help = "Disable LLM narratives for this run")]
    no_llm: bool,
    #[arg(long, global = true, help = "Override llm.provider (openai|ollama)")]
    llm_provider: Option<LlmProvider>,
    #[arg(long, global = true, help = "Override llm.model")]
    llm_model: Option<String>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_file: self.config.is_some(),
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                database_url: self.database_url.clone(),
                log_level: self.log_level.clone(),
                llm_enabled: self.no_llm.then_some(false),
                llm_provider: self.llm_provider,
                llm_model: self.llm_model.clone(),
                narrative_top_n: self.narrative_top_n,
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Migrate and load the deterministic demo league")]
    Seed,
    #[command(about = "Recompute season aggregates from match records")]
    Aggregate {
        #[arg(long)]
        season: i32,
    },
    #[command(about = "Score every candidate from other teams for one team")]
    Recommend {
        #[arg(long)]
        team: i64,
        #[arg(long)]
        season: i32,
    },
    #[command(about = "Run recommendations for every team of a season")]
    Batch {
        #[arg(long)]
        season: i32,
    },
    #[command(about = "Show a team's top stored recommendations")]
    View {
        #[arg(long)]
        team: i64,
        #[arg(long)]
        season: i32,
        #[arg(long, help = "Rows to return; defaults to scouting.view_limit")]
        limit: Option<u32>,
    },
    #[command(about = "Report team squad shape and per-position averages for a season")]
    Analyze {
        #[arg(long)]
        season: i32,
    },
    #[command(about = "Inspect effective configuration with secrets redacted")]
    Config,
    #[command(about = "Validate config, LLM readiness, DB connectivity and schema state")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(&options),
        Command::Seed => commands::seed::run(&options),
        Command::Aggregate { season } => commands::aggregate::run(&options, Season(season)),
        Command::Recommend { team, season } => {
            commands::recommend::run(&options, TeamId(team), Season(season))
        }
        Command::Batch { season } => commands::batch::run(&options, Season(season)),
        Command::View { team, season, limit } => {
            commands::view::run(&options, TeamId(team), Season(season), limit)
        }
        Command::Analyze { season } => commands::analyze::run(&options, Season(season)),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use scoutbook_core::config::LlmProvider;

    use super::{Cli, Command};

    #[test]
    fn global_overrides_reach_load_options() {
        let cli = Cli::parse_from([
            "scoutbook",
            "view",
            "--team",
            "3",
            "--season",
            "2024",
            "--database-url",
            "sqlite://other.db",
            "--no-llm",
        ]);

        let options = cli.global.load_options();
        assert_eq!(options.overrides.database_url.as_deref(), Some("sqlite://other.db"));
        assert_eq!(options.overrides.llm_enabled, Some(false));
        assert!(!options.require_file);
        assert!(matches!(cli.command, Command::View { team: 3, season: 2024, limit: None }));
    }

    #[test]
    fn llm_flags_override_provider_and_model() {
        let cli = Cli::parse_from([
            "scoutbook",
            "recommend",
            "--team",
            "1",
            "--season",
            "2024",
            "--llm-provider",
            "ollama",
            "--llm-model",
            "llama3",
        ]);

        let options = cli.global.load_options();
        assert_eq!(options.overrides.llm_provider, Some(LlmProvider::Ollama));
        assert_eq!(options.overrides.llm_model.as_deref(), Some("llama3"));
        assert_eq!(options.overrides.llm_enabled, None);
    }

    #[test]
    fn unknown_llm_provider_is_rejected_by_the_parser() {
        let parsed = Cli::try_parse_from(["scoutbook", "--llm-provider", "bard", "config"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn explicit_config_path_is_required_to_exist() {
        let cli = Cli::parse_from(["scoutbook", "--config", "custom.toml", "config"]);
        let options = cli.global.load_options();
        assert!(options.require_file);
        assert_eq!(options.config_path.as_deref(), Some(std::path::Path::new("custom.toml")));
    }
}
