use seoquote_core::config::LoadOptions;
use seoquote_core::{PriceRange, QuoteRuntime};

use crate::commands::{load_runtime, money, to_json, CommandResult};

const COMMAND: &str = "tiers";

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let (config, runtime) = match load_runtime(COMMAND, options) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };

    if json_output {
        return to_json(COMMAND, runtime.catalog());
    }

    let currency = &config.pricing.currency_symbol;
    let mut lines = Vec::new();
    for tier in runtime.catalog().iter() {
        lines.push(format!("{} ({})", tier.name, tier.target));
        lines.push(format!("  setup: {}", range(&tier.setup_range, currency)));
        lines.push(format!("  monthly: {}", range(&tier.monthly_range, currency)));
        lines.push(format!("  linkbuilding: {}", range(&tier.linkbuilding_range, currency)));
        for feature in &tier.features {
            lines.push(format!("  - {feature}"));
        }
    }

    CommandResult::raw(lines.join("\n"))
}

fn range(range: &PriceRange, currency: &str) -> String {
    format!("{} - {}", money(range.low, currency), money(range.high, currency))
}
