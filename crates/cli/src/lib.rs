pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use seoquote_core::config::{
    AppConfig, ConfigOverrides, LlmProvider, LoadOptions, LogFormat, ProposalLanguage,
};
use tracing_subscriber::EnvFilter;

use commands::estimate::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "seoquote",
    about = "International SEO partner pricing estimator",
    long_about = "Recommend a service tier, estimate setup and monthly fees, and draft proposal text for international SEO projects.",
    after_help = "Examples:\n  seoquote tiers\n  seoquote estimate --languages 4 --complexity high --articles 2\n  seoquote proposal --languages 3 --language spanish\n  seoquote doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a seoquote.toml config file")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Path to a tier catalog TOML file")]
    pub catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level filter (e.g. info, debug)")]
    pub log_level: Option<String>,
    #[arg(long, global = true, help = "Text service provider: gemini|openai|ollama")]
    pub provider: Option<LlmProvider>,
    #[arg(long, global = true, help = "Text service model name")]
    pub model: Option<String>,
}

impl GlobalArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                llm_provider: self.provider,
                llm_model: self.model.clone(),
                catalog_path: self.catalog.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the service tiers with their price ranges and features")]
    Tiers {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Recommend a tier and estimate setup and monthly fees")]
    Estimate {
        #[command(flatten)]
        quote: QuoteArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Draft an executive-summary proposal for the estimated quote")]
    Proposal {
        #[command(flatten)]
        quote: QuoteArgs,
        #[arg(long, help = "Proposal language: english|spanish (defaults to config)")]
        language: Option<ProposalLanguage>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, catalog, and text service client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();
    init_logging(&options);

    let result = match cli.command {
        Command::Tiers { json } => commands::tiers::run(options, json),
        Command::Estimate { quote, json } => commands::estimate::run(options, &quote, json),
        Command::Proposal { quote, language } => {
            commands::proposal::run(options, &quote, language)
        }
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(options: &LoadOptions) {
    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    let filter = EnvFilter::try_new(&logging.level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
