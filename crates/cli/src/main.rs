mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Checks association declarations and resolves the adapters they need.
#[derive(Parser)]
#[command(
    name = "gluer",
    version,
    about = "Association checker and adapter resolver"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log pipeline details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check specification files against a type universe
    Check {
        /// Specification files (default: the project's specs)
        specs: Vec<PathBuf>,
        /// Type universe JSON document
        #[arg(long)]
        universe: Option<PathBuf>,
        /// Project config file (default: ./gluer.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Resolve the adapter between two types
    Resolve {
        /// Type universe JSON document
        #[arg(long)]
        universe: PathBuf,
        /// Type of the object to adapt
        #[arg(long)]
        from: String,
        /// Type the adapted object must have
        #[arg(long)]
        to: String,
        /// Specification files whose precedence declarations apply
        specs: Vec<PathBuf>,
    },

    /// Parse a specification file and print its declarations
    Parse {
        /// Path to the specification file
        file: PathBuf,
    },

    /// Report precedence cycles
    Cycles {
        /// Specification files (default: the project's specs)
        specs: Vec<PathBuf>,
        /// Type universe; precedence between non-adapters is ignored when given
        #[arg(long)]
        universe: Option<PathBuf>,
        /// Project config file (default: ./gluer.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            specs,
            universe,
            config,
        } => {
            commands::check::cmd_check(specs, universe, config, cli.output, cli.quiet);
        }
        Commands::Resolve {
            universe,
            from,
            to,
            specs,
        } => {
            commands::resolve::cmd_resolve(&universe, &from, &to, &specs, cli.output, cli.quiet);
        }
        Commands::Parse { file } => {
            commands::parse::cmd_parse(&file, cli.output, cli.quiet);
        }
        Commands::Cycles {
            specs,
            universe,
            config,
        } => {
            commands::cycles::cmd_cycles(specs, universe, config, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` applies
/// unless `--verbose` is given.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
