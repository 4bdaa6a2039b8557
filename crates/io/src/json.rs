// JSON export: the full diff result plus its flattened report, as one value

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use billdiff_recon::{DiffResult, Report};

use crate::error::IoError;
use crate::source::create_output;

/// Top-level JSON document written by `diff --out json`.
#[derive(Debug, Serialize)]
pub struct DiffDocument<'a> {
    #[serde(flatten)]
    pub result: &'a DiffResult,
    pub report: &'a Report,
}

pub fn export_result<W: Write>(
    result: &DiffResult,
    report: &Report,
    mut writer: W,
    pretty: bool,
) -> Result<(), IoError> {
    let doc = DiffDocument { result, report };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &doc)?;
    } else {
        serde_json::to_writer(&mut writer, &doc)?;
    }
    writeln!(writer).map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

pub fn export_result_to_path(
    result: &DiffResult,
    report: &Report,
    path: &Path,
    pretty: bool,
) -> Result<(), IoError> {
    export_result(result, report, create_output(path)?, pretty)?;
    log::info!("wrote diff result to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billdiff_recon::{flatten, run, ReconConfig};

    #[test]
    fn single_document_with_result_and_report() {
        let a = "company_name,sku,total\nAcme,S1,10\n";
        let b = "company_name,sku,total\nAcme,S1,10\nAcme,S2,5\n";
        let result = run("a.csv", a, "b.csv", b, &ReconConfig::default()).unwrap();
        let report = flatten(&result);

        let mut out = Vec::new();
        export_result(&result, &report, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["meta"]["label_a"], "a.csv");
        assert_eq!(value["counts"]["added"], 1);
        assert_eq!(value["companies"][0]["entries"][1]["status"], "added");
        assert_eq!(value["companies"][0]["entries"][1]["a"], serde_json::Value::Null);
        assert_eq!(value["report"]["rows"][0]["kind"], "account");
        assert_eq!(value["report"]["rows"][2]["total_change"], 5.0);
    }

    #[test]
    fn writes_pretty_file() {
        let raw = "company_name,sku,total\nAcme,S1,10\n";
        let result = run("a.csv", raw, "b.csv", raw, &ReconConfig::default()).unwrap();
        let report = flatten(&result);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.json");
        export_result_to_path(&result, &report, &path, true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.lines().count() > 1);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["counts"]["unchanged"], 1);
    }
}
