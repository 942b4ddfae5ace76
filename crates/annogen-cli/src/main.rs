//! annogen CLI - Annotation-driven Swift source generator
//!
//! Commands:
//! - `annogen generate` - Generate Swift sources from annotated declarations
//! - `annogen inspect` - Dump parsed declarations and resolved annotations as JSON
//! - `annogen check-config` - Validate an annogen configuration file

use annogen::{LogLevel, Strategy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod check;
mod generate;
mod inputs;
mod inspect;
mod logging;

#[derive(Parser)]
#[command(name = "annogen")]
#[command(author, version, about = "Generate Swift boilerplate from annotated declarations", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error, off)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs and configuration shared by commands that read sources.
#[derive(Args)]
struct SourceArgs {
    /// Swift files or directories (searched recursively for *.swift)
    #[arg(short, long = "input", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Path to an annogen.toml or annogen.json configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads (0 = available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Swift sources
    Generate {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output directory for generated units
        #[arg(short, long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Run only these strategies (repeatable, e.g. autoStub)
        #[arg(short, long = "strategy")]
        strategies: Vec<Strategy>,

        /// Print generated units to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Print parsed declarations and resolved annotations as JSON
    Inspect {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Path to the configuration (default: ./annogen.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.log_level)?;

    let code = match cli.command {
        Commands::Generate {
            sources,
            output,
            strategies,
            stdout,
        } => generate::run(generate::Options {
            inputs: sources.inputs,
            config: sources.config,
            jobs: sources.jobs,
            output,
            strategies,
            stdout,
        })?,
        Commands::Inspect { sources } => {
            inspect::run(&sources.inputs, sources.config.as_deref(), sources.jobs)?
        }
        Commands::CheckConfig { config } => check::run(config)?,
    };

    Ok(code)
}
