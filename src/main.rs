//! Binary entry point for the cellscope CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Classify the identifiers of one code unit
//! cellscope analyze cell.jl
//! echo 'f(x) = x + a' | cellscope analyze -
//!
//! # Analyze every cell of a notebook (or every notebook under a directory)
//! cellscope notebook notebook.jl
//! cellscope --format text notebook notebooks/
//!
//! # Dump the parse tree
//! cellscope tree cell.jl
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use cellscope::cli::{read_input, run_analyze, run_notebook, run_tree, CliOptions, OutputFormat};
use cellscope::output::{emit_response, ErrorResponse};
use cellscope::CellscopeError;

// ============================================================================
// CLI Structure
// ============================================================================

/// Variable usage and scope explorer for Julia notebook cells.
///
/// Reports, for each code unit, the names it defines globally, the names it
/// reads, and the names bound only inside nested scopes. Output is JSON by
/// default.
#[derive(Parser, Debug)]
#[command(name = "cellscope", version, about = "Variable usage and scope explorer for Julia notebook cells")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Leave locals out of the output.
    #[arg(long, global = true)]
    no_locals: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Format of log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the identifiers of a single code unit.
    Analyze {
        /// Source file (`-` or absent for stdin).
        file: Option<PathBuf>,
        /// Treat the input as the body of a quotation.
        #[arg(long)]
        quoted: bool,
    },
    /// Analyze every cell of a Pluto notebook.
    Notebook {
        /// Notebook file, or a directory to search for notebooks.
        path: PathBuf,
    },
    /// Print the parse tree.
    Tree {
        /// Source file (`-` or absent for stdin).
        file: Option<PathBuf>,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // errors go to stdout as JSON
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber on stderr.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CellscopeError> {
    let mut options = CliOptions {
        format: cli.global.format,
        include_locals: !cli.global.no_locals,
        quoted: false,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Analyze { file, quoted } => {
            options.quoted = quoted;
            let input = read_input(file.as_deref())?;
            run_analyze(&input, &options, &mut stdout)
        }
        Command::Notebook { path } => run_notebook(&path, &options, &mut stdout),
        Command::Tree { file } => {
            let input = read_input(file.as_deref())?;
            run_tree(&input, options.format, &mut stdout)
        }
    }
}
