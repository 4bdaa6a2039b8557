// `billdiff inspect`: what the engine will see in one export

use std::path::PathBuf;

use serde::Serialize;

use billdiff_io::source::label_for;
use billdiff_recon::config::{Delimiter, ReconConfig};
use billdiff_recon::decode::decode;
use billdiff_recon::materialize::materialize;

use crate::{CliError, InputOptions};

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Export to inspect
    pub file: PathBuf,

    #[command(flatten)]
    pub input: InputOptions,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MissingColumn<'a> {
    role: &'static str,
    column: &'a str,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    file: String,
    delimiter: String,
    line_items: usize,
    companies: Option<usize>,
    headers: &'a [String],
    missing_columns: Vec<MissingColumn<'a>>,
}

pub fn cmd_inspect(args: InspectArgs) -> Result<(), CliError> {
    let config: ReconConfig = args.input.resolve()?;
    let raw = billdiff_io::read_file_as_utf8(&args.file).map_err(CliError::from_io)?;

    let delimiter = config.decode.delimiter.resolve(&raw);
    let dataset = materialize(&label_for(&args.file), decode(&raw, delimiter)).map_err(CliError::recon)?;

    let missing_columns: Vec<MissingColumn> = config
        .columns
        .entries()
        .into_iter()
        .filter(|(_, column)| !dataset.has_column(column))
        .map(|(role, column)| MissingColumn { role, column })
        .collect();

    let report = InspectReport {
        file: dataset.label.clone(),
        delimiter: String::from(Delimiter::Byte(delimiter)),
        line_items: dataset.len(),
        companies: dataset.company_count(&config.columns.company),
        headers: &dataset.headers,
        missing_columns,
    };

    if args.json {
        let json = serde_json::to_string(&report)
            .map_err(|e| CliError::io(format!("cannot encode JSON: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    println!("file: {}", report.file);
    println!("delimiter: {}", report.delimiter);
    println!("line_items: {}", report.line_items);
    match report.companies {
        Some(n) => println!("companies: {n}"),
        None => println!("companies: - (no '{}' column)", config.columns.company),
    }
    println!("headers: {}", report.headers.join(", "));
    if report.missing_columns.is_empty() {
        println!("missing: none");
    } else {
        for missing in &report.missing_columns {
            println!("missing: {} (column '{}')", missing.role, missing.column);
        }
    }
    Ok(())
}
