// billdiff CLI - compare two invoice line-item exports

mod config_cmd;
mod diff;
mod exit_codes;
mod inspect;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use billdiff_io::IoError;
use billdiff_recon::config::Delimiter;
use billdiff_recon::{ReconConfig, ReconError};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "billdiff")]
#[command(about = "Reconcile two billing line-item exports by company and SKU")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two invoice exports
    #[command(after_help = "\
Exit code 1 indicates differences: items added, removed, or modified after \
rounding. Use --no-fail to report differences but still exit 0.

Examples:
  billdiff diff march.csv april.csv
  billdiff diff march.csv april.csv --out csv --output changes.csv --changes-only
  billdiff diff march.csv april.csv --out xlsx --output comparison.xlsx
  billdiff diff march.csv april.csv --config vendor.toml --delimiter auto
  cat april.csv | billdiff diff march.csv - --label-b April")]
    Diff(diff::DiffArgs),

    /// Show headers, line-item count, and missing columns of an export
    #[command(after_help = "\
Examples:
  billdiff inspect march.csv
  billdiff inspect march.csv --json --config vendor.toml")]
    Inspect(inspect::InspectArgs),

    /// Validate or print configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Options shared by commands that read input files.
#[derive(clap::Args, Clone)]
pub struct InputOptions {
    /// Config file (TOML); defaults apply when omitted
    #[arg(long, env = "BILLDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Field delimiter: a single character, "tab", or "auto" (overrides config)
    #[arg(long)]
    pub delimiter: Option<String>,
}

impl InputOptions {
    /// Effective config: file (or defaults) with command-line overrides applied.
    pub fn resolve(&self) -> Result<ReconConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                load_config(path)?
            }
            None => ReconConfig::default(),
        };
        if let Some(delimiter) = &self.delimiter {
            config.decode.delimiter = Delimiter::try_from(delimiter.clone())
                .map_err(|e| CliError::args(format!("--delimiter: {e}")))?;
        }
        Ok(config)
    }
}

pub fn load_config(path: &std::path::Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        CliError::recon(e).with_hint(format!(
            "check {}; `billdiff config show` prints every key with its default",
            path.display()
        ))
    })
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Xlsx,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SummaryMode {
    Stderr,
    None,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  billdiff-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
            "\ncontract_version(diff): 1",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  billdiff-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
            "\ncontract_version(diff): 1",
        )
    }
}

fn init_logging(quiet: bool) {
    // Logs go to stderr; stdout is reserved for command output
    let default_level = if quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Commands::Diff(args) if args.quiet);
    init_logging(quiet);

    let result = match cli.command {
        Commands::Diff(args) => diff::cmd_diff(args),
        Commands::Inspect(args) => inspect::cmd_inspect(args),
        Commands::Config(command) => config_cmd::cmd_config(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Exit with `code` and print nothing.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::InsufficientData { .. } => {
                Some("an export needs a header row followed by at least one line item".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn from_io(err: IoError) -> Self {
        match err {
            IoError::Recon(inner) => Self::recon(inner),
            other => Self { code: io_exit_code(&other), message: other.to_string(), hint: None },
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
