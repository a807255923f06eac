mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use commands::step::StepArgs;
use config::TickConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Tick story toolchain.
#[derive(Parser)]
#[command(name = "tick", version, about = "Tick story toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ./tick.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a story document against the schema and for consistency
    Validate {
        /// Path to the story JSON document
        file: PathBuf,
    },

    /// Show the states and transitions of a story
    Inspect {
        /// Path to the story JSON document
        file: PathBuf,
    },

    /// Evaluate one conversation turn
    Step(StepArgs),

    /// Publish stories to an in-memory store and print the version records
    Publish {
        /// Story JSON documents, published in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match config::resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    init_logging(&config);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Validate { file } => {
            commands::validate::cmd_validate(&file, &config, cli.output, cli.quiet);
        }
        Commands::Inspect { file } => {
            commands::inspect::cmd_inspect(&file, cli.output, cli.quiet);
        }
        Commands::Step(args) => {
            commands::step::cmd_step(&args, cli.output, cli.quiet);
        }
        Commands::Publish { files } => {
            commands::publish::cmd_publish(&files, &config, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr. `TICK_LOG` overrides the configured level.
fn init_logging(config: &TickConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TICK_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
