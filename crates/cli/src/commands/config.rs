use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use seoquote_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct FieldSources<'a> {
    file_doc: Option<&'a Value>,
    file_path: Option<&'a Path>,
}

impl FieldSources<'_> {
    fn line(&self, key: &str, value: &str, env_keys: &[&str]) -> String {
        render_line(key, value, field_source(key, env_keys, self.file_doc, self.file_path))
    }
}

pub fn run(options: LoadOptions) -> CommandResult {
    let explicit_path = options.config_path.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_path = detect_config_path(explicit_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let sources =
        FieldSources { file_doc: config_file_doc.as_ref(), file_path: config_file_path.as_deref() };

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let catalog_path = config
        .pricing
        .catalog_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in>".to_string());

    let lines = vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
        sources.line(
            "llm.provider",
            &format!("{:?}", config.llm.provider),
            &["SEOQUOTE_LLM_PROVIDER"],
        ),
        sources.line("llm.model", &config.llm.model, &["SEOQUOTE_LLM_MODEL"]),
        sources.line(
            "llm.base_url",
            config.llm.base_url.as_deref().unwrap_or("<unset>"),
            &["SEOQUOTE_LLM_BASE_URL"],
        ),
        sources.line("llm.api_key", llm_api_key, &["SEOQUOTE_LLM_API_KEY"]),
        sources.line(
            "llm.timeout_secs",
            &config.llm.timeout_secs.to_string(),
            &["SEOQUOTE_LLM_TIMEOUT_SECS"],
        ),
        sources.line(
            "llm.max_retries",
            &config.llm.max_retries.to_string(),
            &["SEOQUOTE_LLM_MAX_RETRIES"],
        ),
        sources.line(
            "proposal.language",
            &format!("{:?}", config.proposal.language),
            &["SEOQUOTE_PROPOSAL_LANGUAGE"],
        ),
        sources.line("pricing.catalog_path", &catalog_path, &["SEOQUOTE_PRICING_CATALOG_PATH"]),
        sources.line(
            "pricing.currency_symbol",
            &config.pricing.currency_symbol,
            &["SEOQUOTE_PRICING_CURRENCY_SYMBOL"],
        ),
        sources.line(
            "server.bind_address",
            &config.server.bind_address,
            &["SEOQUOTE_SERVER_BIND_ADDRESS"],
        ),
        sources.line("server.port", &config.server.port.to_string(), &["SEOQUOTE_SERVER_PORT"]),
        sources.line(
            "server.session_ttl_secs",
            &config.server.session_ttl_secs.to_string(),
            &["SEOQUOTE_SERVER_SESSION_TTL_SECS"],
        ),
        sources.line(
            "server.max_sessions",
            &config.server.max_sessions.to_string(),
            &["SEOQUOTE_SERVER_MAX_SESSIONS"],
        ),
        sources.line(
            "logging.level",
            &config.logging.level,
            &["SEOQUOTE_LOGGING_LEVEL", "SEOQUOTE_LOG_LEVEL"],
        ),
        sources.line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            &["SEOQUOTE_LOGGING_FORMAT", "SEOQUOTE_LOG_FORMAT"],
        ),
    ];

    CommandResult::raw(lines.join("\n"))
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("seoquote.toml"), PathBuf::from("config/seoquote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
