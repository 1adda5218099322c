use std::env;
use std::sync::{Mutex, OnceLock};

use scoutbook_cli::commands::{aggregate, analyze, batch, config, doctor, migrate, recommend, seed, view};
use scoutbook_core::config::{ConfigOverrides, LoadOptions};
use scoutbook_core::domain::player::{Season, TeamId};
use serde_json::Value;
use tempfile::TempDir;

const SEASON: Season = Season(2024);

#[test]
fn migrate_returns_success_with_file_database() {
    with_database(|options| {
        let result = migrate::run(options);
        assert_eq!(result.exit_code, 0, "expected successful migrate run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn invalid_env_is_a_config_failure() {
    with_env(&[("SCOUTBOOK_SCOUTING_VIEW_LIMIT", "0")], || {
        let result = migrate::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn unreachable_database_is_a_connectivity_failure() {
    let options = LoadOptions {
        overrides: ConfigOverrides {
            database_url: Some("sqlite:///nonexistent-dir/deeper/scoutbook.db".to_string()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    };
    with_env(&[], || {
        let result = migrate::run(&options);
        assert_eq!(result.exit_code, 4, "expected db connectivity code: {}", result.output);
        assert_eq!(parse_payload(&result.output)["error_class"], "db_connectivity");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_database(|options| {
        let first = seed::run(options);
        assert_eq!(first.exit_code, 0, "expected first seed success: {}", first.output);
        let second = seed::run(options);
        assert_eq!(second.exit_code, 0, "expected second seed success");

        let first_payload = parse_payload(&first.output);
        let second_payload = parse_payload(&second.output);
        assert_eq!(first_payload["message"], second_payload["message"]);
        assert!(first_payload["message"]
            .as_str()
            .unwrap_or_default()
            .contains("4 teams, 70 players, 420 match records, 70 season stats"));
    });
}

#[test]
fn recommend_then_view_returns_ranked_rows() {
    with_database(|options| {
        assert_eq!(seed::run(options).exit_code, 0);

        let run = recommend::run(options, TeamId(1), SEASON);
        assert_eq!(run.exit_code, 0, "recommend failed: {}", run.output);
        let run_payload = parse_payload(&run.output);
        assert_eq!(run_payload["command"], "recommend");
        assert_eq!(run_payload["data"]["team_id"], 1);
        assert_eq!(run_payload["data"]["narratives_attached"], 0);
        assert_eq!(
            run_payload["data"]["recommendations"].as_array().map(Vec::len),
            Some(19 + 17 + 18)
        );

        let listed = view::run(options, TeamId(1), SEASON, Some(3));
        assert_eq!(listed.exit_code, 0, "view failed: {}", listed.output);
        let rows = parse_payload(&listed.output)["data"].as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 3);
        let scores: Vec<f64> = rows.iter().filter_map(|row| row["score"].as_f64()).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "rows should be ranked");
        assert_eq!(
            rows[0]["player_id"],
            run_payload["data"]["recommendations"][0]["key"]["player_id"]
        );
    });
}

#[test]
fn view_rejects_zero_limit() {
    with_database(|options| {
        assert_eq!(migrate::run(options).exit_code, 0);

        let result = view::run(options, TeamId(1), SEASON, Some(0));
        assert_eq!(result.exit_code, 6);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "domain");
        assert_eq!(
            payload["user_message"],
            "The request could not be processed. Check team and season and try again."
        );
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    });
}

#[test]
fn batch_and_aggregate_report_counts() {
    with_database(|options| {
        assert_eq!(seed::run(options).exit_code, 0);

        let aggregated = aggregate::run(options, SEASON);
        assert_eq!(aggregated.exit_code, 0);
        assert_eq!(
            parse_payload(&aggregated.output)["message"],
            "recomputed 70 season aggregate(s) for season 2024"
        );

        let summary = batch::run(options, SEASON);
        assert_eq!(summary.exit_code, 0, "batch failed: {}", summary.output);
        let payload = parse_payload(&summary.output);
        assert_eq!(payload["data"]["teams_processed"], 4);
        assert_eq!(payload["data"]["recommendations_written"], 70 * 3);
    });
}

#[test]
fn analyze_reports_every_team() {
    with_database(|options| {
        assert_eq!(seed::run(options).exit_code, 0);

        let result = analyze::run(options, SEASON);
        assert_eq!(result.exit_code, 0, "analyze failed: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["teams"].as_array().map(Vec::len), Some(4));
        assert_eq!(payload["data"]["positions"].as_array().map(Vec::len), Some(16));
        assert!(payload["data"]["league_avg_rating"].as_f64().unwrap_or_default() > 6.0);
    });
}

#[test]
fn config_redacts_api_key_and_attributes_sources() {
    with_env(&[("SCOUTBOOK_LLM_API_KEY", "sk-secret-value"), ("SCOUTBOOK_LLM_MODEL", "gpt-4o")], || {
        let result = config::run(&LoadOptions::default());
        assert_eq!(result.exit_code, 0);
        assert!(!result.output.contains("sk-secret-value"), "api key must never be printed");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["effective"]["llm_api_key_set"], true);
        assert_eq!(payload["data"]["effective"]["llm_model"], "gpt-4o");

        let sources = payload["data"]["sources"].as_array().cloned().unwrap_or_default();
        let source_of = |key: &str| {
            sources
                .iter()
                .find(|entry| entry["key"] == key)
                .and_then(|entry| entry["source"].as_str().map(str::to_string))
        };
        assert_eq!(source_of("llm.model").as_deref(), Some("env (SCOUTBOOK_LLM_MODEL)"));
        assert_eq!(source_of("database.url").as_deref(), Some("default"));
    });
}

#[test]
fn doctor_reports_pending_migrations_then_passes() {
    with_database(|options| {
        let before = doctor::run(options, true);
        let report: Value = serde_json::from_str(&before.output).expect("doctor json");
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(before.exit_code, 1);

        assert_eq!(migrate::run(options).exit_code, 0);

        let after = doctor::run(options, true);
        let report: Value = serde_json::from_str(&after.output).expect("doctor json");
        assert_eq!(report["overall_status"], "pass", "doctor output: {}", after.output);
        assert_eq!(after.exit_code, 0);

        let human = doctor::run(options, false);
        assert!(human.output.contains("[skip] llm_readiness"));
        assert!(human.output.contains("[ok] schema_migrations"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

/// Runs `test_fn` against a fresh SQLite file with a clean environment.
fn with_database(test_fn: impl FnOnce(&LoadOptions)) {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("scoutbook.db").display());
    let options = LoadOptions {
        overrides: ConfigOverrides { database_url: Some(url), ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    with_env(&[], || test_fn(&options));
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "SCOUTBOOK_DATABASE_URL",
        "SCOUTBOOK_DATABASE_MAX_CONNECTIONS",
        "SCOUTBOOK_DATABASE_TIMEOUT_SECS",
        "SCOUTBOOK_LLM_ENABLED",
        "SCOUTBOOK_LLM_PROVIDER",
        "SCOUTBOOK_LLM_API_KEY",
        "SCOUTBOOK_LLM_BASE_URL",
        "SCOUTBOOK_LLM_MODEL",
        "SCOUTBOOK_LLM_TIMEOUT_SECS",
        "SCOUTBOOK_LLM_MAX_RETRIES",
        "SCOUTBOOK_SCOUTING_NARRATIVE_TOP_N",
        "SCOUTBOOK_SCOUTING_VIEW_LIMIT",
        "SCOUTBOOK_LOGGING_LEVEL",
        "SCOUTBOOK_LOGGING_FORMAT",
        "SCOUTBOOK_LOG_LEVEL",
        "SCOUTBOOK_LOG_FORMAT",
        "OPENAI_API_KEY",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
