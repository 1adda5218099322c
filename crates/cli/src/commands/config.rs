use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use scoutbook_core::config::{AppConfig, LoadOptions, RedactedConfig};
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ConfigReport {
    precedence: &'static str,
    config_file: Option<String>,
    effective: RedactedConfig,
    sources: Vec<FieldSource>,
}

#[derive(Debug, Serialize)]
struct FieldSource {
    key: &'static str,
    source: String,
}

/// Config keys paired with the environment variable that can set them.
const TRACKED_FIELDS: &[(&str, &str)] = &[
    ("database.url", "SCOUTBOOK_DATABASE_URL"),
    ("database.max_connections", "SCOUTBOOK_DATABASE_MAX_CONNECTIONS"),
    ("database.timeout_secs", "SCOUTBOOK_DATABASE_TIMEOUT_SECS"),
    ("llm.enabled", "SCOUTBOOK_LLM_ENABLED"),
    ("llm.provider", "SCOUTBOOK_LLM_PROVIDER"),
    ("llm.api_key", "SCOUTBOOK_LLM_API_KEY"),
    ("llm.base_url", "SCOUTBOOK_LLM_BASE_URL"),
    ("llm.model", "SCOUTBOOK_LLM_MODEL"),
    ("llm.timeout_secs", "SCOUTBOOK_LLM_TIMEOUT_SECS"),
    ("llm.max_retries", "SCOUTBOOK_LLM_MAX_RETRIES"),
    ("scouting.narrative_top_n", "SCOUTBOOK_SCOUTING_NARRATIVE_TOP_N"),
    ("scouting.view_limit", "SCOUTBOOK_SCOUTING_VIEW_LIMIT"),
    ("logging.level", "SCOUTBOOK_LOGGING_LEVEL"),
    ("logging.format", "SCOUTBOOK_LOGGING_FORMAT"),
];

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let sources = TRACKED_FIELDS
        .iter()
        .map(|&(key, env_key)| FieldSource {
            key,
            source: field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        })
        .collect();

    CommandResult::report(
        "config",
        &ConfigReport {
            precedence: "override > env > file > default",
            config_file: config_file_path.map(|path| path.display().to_string()),
            effective: config.redacted(),
            sources,
        },
    )
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    ["scoutbook.toml", "config/scoutbook.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if config_file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file_path = config_file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
