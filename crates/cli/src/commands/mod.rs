pub mod config;
pub mod doctor;
pub mod estimate;
pub mod proposal;
pub mod tiers;

use rust_decimal::Decimal;
use seoquote_core::config::{AppConfig, LoadOptions};
use seoquote_core::pricing::{
    estimator::DeterministicPriceEstimator, selector::DeterministicTierSelector,
};
use seoquote_core::DeterministicQuoteRuntime;
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_CATALOG: u8 = 4;
pub const EXIT_PROPOSAL_FALLBACK: u8 = 5;

pub type PartnerRuntime =
    DeterministicQuoteRuntime<DeterministicTierSelector, DeterministicPriceEstimator>;

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
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
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
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn raw(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration and the quote runtime it points at, or the failure
/// envelope to print instead.
pub(crate) fn load_runtime(
    command: &str,
    options: LoadOptions,
) -> Result<(AppConfig, PartnerRuntime), CommandResult> {
    let config = AppConfig::load(options).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })?;

    let (catalog, policy) = config.pricing.resolve_catalog().map_err(|error| {
        CommandResult::failure(command, "catalog", error.to_string(), EXIT_CATALOG)
    })?;
    let runtime = DeterministicQuoteRuntime::with_catalog(catalog, policy).map_err(|error| {
        CommandResult::failure(command, "catalog", error.to_string(), EXIT_CATALOG)
    })?;

    Ok((config, runtime))
}

pub(crate) fn money(amount: Decimal, currency: &str) -> String {
    format!("{amount}{currency}")
}

pub(crate) fn to_json<T: Serialize>(command: &str, value: &T) -> CommandResult {
    match serde_json::to_string_pretty(value) {
        Ok(output) => CommandResult::raw(output),
        Err(error) => CommandResult::failure(command, "serialization", error.to_string(), 1),
    }
}
