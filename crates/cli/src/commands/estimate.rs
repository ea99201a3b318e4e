use clap::Args;
use seoquote_core::config::LoadOptions;
use seoquote_core::{
    AddonQuantities, Complexity, ProjectConfiguration, QuoteEvaluation, QuoteRuntime, SiteType,
};
use tracing::info;

use crate::commands::{load_runtime, money, to_json, CommandResult, EXIT_INVALID_INPUT};

const COMMAND: &str = "estimate";

/// Project inputs and add-on quantities shared by `estimate` and `proposal`.
#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long, default_value_t = 2, help = "Number of target languages (at least 1)")]
    pub languages: u32,
    #[arg(long, default_value = "medium", help = "Project complexity: low|medium|high")]
    pub complexity: Complexity,
    #[arg(long, default_value = "blog_or_saas", help = "Site type: blog_or_saas|ecommerce|enterprise")]
    pub site_type: SiteType,
    #[arg(long, default_value = "medium", help = "Technical debt: low|medium|high")]
    pub technical_debt: Complexity,
    #[arg(long, default_value = "medium", help = "Content volume: low|medium|high")]
    pub content_volume: Complexity,
    #[arg(long, default_value_t = 0, help = "Extra articles per month")]
    pub articles: u32,
    #[arg(long, default_value_t = 0, help = "Extra landing pages per month")]
    pub landings: u32,
    #[arg(long, default_value_t = 0, help = "Extra technical sprints per month")]
    pub sprints: u32,
}

impl Default for QuoteArgs {
    fn default() -> Self {
        let configuration = ProjectConfiguration::default();
        Self {
            languages: configuration.language_count,
            complexity: configuration.complexity,
            site_type: configuration.site_type,
            technical_debt: configuration.technical_debt,
            content_volume: configuration.content_volume,
            articles: 0,
            landings: 0,
            sprints: 0,
        }
    }
}

impl QuoteArgs {
    pub fn configuration(&self) -> Result<ProjectConfiguration, seoquote_core::DomainError> {
        ProjectConfiguration::new(
            self.languages,
            self.complexity,
            self.site_type,
            self.technical_debt,
            self.content_volume,
        )
    }

    pub fn addons(&self) -> AddonQuantities {
        AddonQuantities::new(self.articles, self.landings, self.sprints)
    }
}

/// Validated inputs evaluated against the configured runtime.
pub(crate) fn evaluate(
    command: &str,
    options: LoadOptions,
    args: &QuoteArgs,
) -> Result<(seoquote_core::config::AppConfig, QuoteEvaluation), CommandResult> {
    let configuration = args.configuration().map_err(|error| {
        CommandResult::failure(command, "invalid_input", error.to_string(), EXIT_INVALID_INPUT)
    })?;
    let (config, runtime) = load_runtime(command, options)?;

    let evaluation = runtime.evaluate(&configuration, &args.addons());
    info!(
        event_name = "quote.evaluated",
        tier = %evaluation.tier.id,
        setup_cost = %evaluation.estimate.setup_cost,
        monthly_cost = %evaluation.estimate.monthly_cost,
        fingerprint = %evaluation.snapshot.fingerprint(),
        "quote evaluated"
    );
    Ok((config, evaluation))
}

pub fn run(options: LoadOptions, args: &QuoteArgs, json_output: bool) -> CommandResult {
    let (config, evaluation) = match evaluate(COMMAND, options, args) {
        Ok(evaluated) => evaluated,
        Err(result) => return result,
    };

    if json_output {
        return to_json(COMMAND, &evaluation);
    }

    CommandResult::raw(render_human(&evaluation, &config.pricing.currency_symbol))
}

const HEADLINE_FEATURES: usize = 3;

fn render_human(evaluation: &QuoteEvaluation, currency: &str) -> String {
    let estimate = &evaluation.estimate;
    let mut lines = vec![
        format!("recommended plan: {} ({})", evaluation.tier.name, evaluation.tier.target),
        format!("setup cost: {}", money(estimate.setup_cost, currency)),
        format!("monthly fee: {}", money(estimate.monthly_cost, currency)),
        format!("extra languages: {}", estimate.extra_language_count),
        format!(
            "recommended linkbuilding: {} - {}",
            money(estimate.recommended_linkbuilding_low, currency),
            money(estimate.recommended_linkbuilding_high, currency)
        ),
    ];

    lines.push(format!("{} includes:", evaluation.tier.short_name()));
    for feature in evaluation.tier.headline_features(HEADLINE_FEATURES) {
        lines.push(format!("  - {feature}"));
    }

    lines.push("breakdown:".to_string());

    for bar in &evaluation.breakdown.bars {
        lines.push(format!("  - {}: {}", bar.label, money(bar.amount, currency)));
    }

    if !evaluation.breakdown.selected_addons.is_empty() {
        lines.push("add-ons:".to_string());
        for addon in &evaluation.breakdown.selected_addons {
            lines.push(format!("  - {} x{}", addon.label, addon.quantity));
        }
    }

    lines.push("trace:".to_string());
    for step in &estimate.trace.steps {
        lines.push(format!(
            "  - {} ({}): setup {} / monthly {}",
            step.stage, step.detail, step.setup, step.monthly
        ));
    }

    lines.join("\n")
}
