use seoquote_agent::ProposalGenerator;
use seoquote_core::config::{AppConfig, LoadOptions};
use seoquote_core::{
    AddonQuantities, DeterministicQuoteRuntime, ProjectConfiguration, QuoteRuntime,
};
use serde::Serialize;

use crate::commands::PartnerRuntime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let runtime = check_catalog(&config, &mut checks);
            check_proposal_client(&config, runtime.as_ref(), &mut checks);
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_load"));
            checks.push(skipped("proposal_client"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig, checks: &mut Vec<DoctorCheck>) -> Option<PartnerRuntime> {
    let loaded = config
        .pricing
        .resolve_catalog()
        .map_err(|error| error.to_string())
        .and_then(|(catalog, policy)| {
            DeterministicQuoteRuntime::with_catalog(catalog, policy)
                .map_err(|error| error.to_string())
        });

    match loaded {
        Ok(runtime) => {
            let source = config
                .pricing
                .catalog_path
                .as_ref()
                .map(|path| format!("`{}`", path.display()))
                .unwrap_or_else(|| "built-in partner catalog".to_string());
            checks.push(DoctorCheck {
                name: "catalog_load",
                status: CheckStatus::Pass,
                details: format!(
                    "{} tiers loaded from {source}",
                    runtime.catalog().iter().count()
                ),
            });
            Some(runtime)
        }
        Err(error) => {
            checks.push(DoctorCheck { name: "catalog_load", status: CheckStatus::Fail, details: error });
            None
        }
    }
}

fn check_proposal_client(
    config: &AppConfig,
    runtime: Option<&PartnerRuntime>,
    checks: &mut Vec<DoctorCheck>,
) {
    let Some(runtime) = runtime else {
        checks.push(skipped("proposal_client"));
        return;
    };

    let generator = match ProposalGenerator::from_config(config) {
        Ok(generator) => generator,
        Err(error) => {
            checks.push(DoctorCheck {
                name: "proposal_client",
                status: CheckStatus::Fail,
                details: format!("{error:#}"),
            });
            return;
        }
    };

    let sample =
        runtime.evaluate(&ProjectConfiguration::default(), &AddonQuantities::default());
    let check = match generator.prompt_for(&sample) {
        Ok(_) => DoctorCheck {
            name: "proposal_client",
            status: CheckStatus::Pass,
            details: format!(
                "{:?} client ready (model `{}`, {:?} prompts)",
                config.llm.provider,
                config.llm.model,
                generator.language()
            ),
        },
        Err(error) => DoctorCheck {
            name: "proposal_client",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    };
    checks.push(check);
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because a prerequisite check failed".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
