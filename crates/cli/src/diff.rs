// `billdiff diff`: load two exports, compare, write the report

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use billdiff_io::source::label_for;
use billdiff_recon::report::{flatten_with, FlattenOptions};
use billdiff_recon::{DiffResult, Report, ReconSession, Side};

use crate::exit_codes::EXIT_DIFFERENCES;
use crate::{CliError, InputOptions, OutputFormat, SummaryMode};

#[derive(clap::Args)]
pub struct DiffArgs {
    /// Dataset A, the baseline (file path, or - for stdin)
    pub a: String,

    /// Dataset B, compared against A (file path, or - for stdin)
    pub b: String,

    #[command(flatten)]
    pub input: InputOptions,

    /// Output format
    #[arg(long, alias = "format", default_value = "json")]
    pub out: OutputFormat,

    /// Output file (default: stdout; required for xlsx)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Label for dataset A (default: file name)
    #[arg(long)]
    pub label_a: Option<String>,

    /// Label for dataset B (default: file name)
    #[arg(long)]
    pub label_b: Option<String>,

    /// Leave unchanged items (and accounts without changes) out of the report
    #[arg(long)]
    pub changes_only: bool,

    /// Summary output destination
    #[arg(long, default_value = "stderr")]
    pub summary: SummaryMode,

    /// Exit 0 even when differences are found
    #[arg(long)]
    pub no_fail: bool,

    /// Quiet mode - suppress stderr summary and warnings
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn cmd_diff(args: DiffArgs) -> Result<(), CliError> {
    if args.a == "-" && args.b == "-" {
        return Err(CliError::args("only one dataset can be read from stdin"));
    }
    if matches!(args.out, OutputFormat::Xlsx) && args.output.is_none() {
        return Err(CliError::args("--out xlsx requires --output")
            .with_hint("billdiff diff a.csv b.csv --out xlsx --output comparison.xlsx"));
    }

    let config = args.input.resolve()?;
    let mut session = ReconSession::new(config);

    for (side, source, label) in [
        (Side::A, &args.a, &args.label_a),
        (Side::B, &args.b, &args.label_b),
    ] {
        let (raw, default_label) = read_source(source)?;
        let label = label.clone().unwrap_or(default_label);
        session.load(side, &label, &raw).map_err(CliError::recon)?;
    }

    let result = session.compare().map_err(CliError::recon)?;
    let report = flatten_with(
        &result,
        FlattenOptions {
            changes_only: args.changes_only,
        },
    );

    write_output(&result, &report, args.out, args.output.as_deref())?;

    if !args.quiet && matches!(args.summary, SummaryMode::Stderr) {
        print_summary(&report, result.warnings.len());
    }

    if result.has_differences() && !args.no_fail {
        return Err(CliError::silent(EXIT_DIFFERENCES));
    }
    Ok(())
}

/// Raw text and default label for a path or `-`.
fn read_source(source: &str) -> Result<(String, String), CliError> {
    if source == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
        return Ok((raw, "stdin".to_string()));
    }

    let path = Path::new(source);
    let raw = billdiff_io::read_file_as_utf8(path).map_err(CliError::from_io)?;
    Ok((raw, label_for(path)))
}

fn write_output(
    result: &DiffResult,
    report: &Report,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let written = match (format, output) {
        (OutputFormat::Xlsx, Some(path)) => billdiff_io::xlsx::export_report(report, path),
        (OutputFormat::Xlsx, None) => return Err(CliError::args("--out xlsx requires --output")),
        (OutputFormat::Csv, Some(path)) => billdiff_io::csv::export_report_to_path(report, path),
        (OutputFormat::Csv, None) => billdiff_io::csv::export_report(report, io::stdout().lock()),
        (OutputFormat::Json, Some(path)) => {
            billdiff_io::json::export_result_to_path(result, report, path, false)
        }
        (OutputFormat::Json, None) => {
            billdiff_io::json::export_result(result, report, io::stdout().lock(), false)
        }
    };
    written.map_err(CliError::from_io)
}

/// Key/value summary on stderr, read from the report's summary record.
fn print_summary(report: &Report, warnings: usize) {
    let s = &report.summary;
    let c = &s.counts;
    eprintln!("a: {}", s.label_a);
    eprintln!("b: {}", s.label_b);
    eprintln!("items: {}", c.total);
    eprintln!("unchanged: {}", c.unchanged);
    eprintln!("modified: {}", c.modified);
    eprintln!("added: {}", c.added);
    eprintln!("removed: {}", c.removed);
    eprintln!("companies: {} ({} with changes)", c.companies, c.companies_changed);
    if warnings > 0 {
        eprintln!("non_numeric_values: {warnings}");
    }
}
