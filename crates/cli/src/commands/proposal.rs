use seoquote_agent::{ProposalGenerator, ProposalOutcome};
use seoquote_core::config::{LoadOptions, ProposalLanguage};

use crate::commands::estimate::{evaluate, QuoteArgs};
use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_PROPOSAL_FALLBACK};

const COMMAND: &str = "proposal";

pub fn run(
    options: LoadOptions,
    args: &QuoteArgs,
    language: Option<ProposalLanguage>,
) -> CommandResult {
    let (config, evaluation) = match evaluate(COMMAND, options, args) {
        Ok(evaluated) => evaluated,
        Err(result) => return result,
    };

    let generator = match ProposalGenerator::from_config(&config) {
        Ok(generator) => generator,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "llm_client",
                format!("{error:#}"),
                EXIT_CONFIG,
            )
        }
    };
    let generator = match language {
        Some(language) => generator.with_language(language),
        None => generator,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            )
        }
    };

    match runtime.block_on(generator.generate(&evaluation)) {
        ProposalOutcome::Generated { text } => CommandResult::success(COMMAND, text),
        ProposalOutcome::Fallback { message, reason } => {
            CommandResult::failure(COMMAND, reason.as_str(), message, EXIT_PROPOSAL_FALLBACK)
        }
    }
}
