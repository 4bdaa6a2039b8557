// CSV export of the flattened report

use std::io::Write;
use std::path::Path;

use billdiff_recon::Report;

use crate::error::IoError;
use crate::source::create_output;

/// Write the report table (header plus one record per row) to `writer`.
pub fn export_report<W: Write>(report: &Report, writer: W) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);

    for record in report.to_table() {
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_report_to_path(report: &Report, path: &Path) -> Result<(), IoError> {
    export_report(report, create_output(path)?)?;
    log::info!("wrote {} report row(s) to {}", report.rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billdiff_recon::{flatten, run, ReconConfig};
    use std::fs;
    use tempfile::tempdir;

    fn sample_report() -> Report {
        let a = "company_name,sku,description,quantity,total\nAcme,S1,\"Widget, large\",2,20\n";
        let b = "company_name,sku,description,quantity,total\nAcme,S1,\"Widget, large\",3,30\n";
        flatten(&run("a.csv", a, "b.csv", b, &ReconConfig::default()).unwrap())
    }

    #[test]
    fn writes_header_and_rows() {
        let mut out = Vec::new();
        export_report(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Company,Status,SKU,Description,Qty (A),Qty (B),Qty Change,Total (A),Total (B),Total Change,Changes"
        );
        assert_eq!(lines[1], "Acme,HAS CHANGES,,,,,,20,30,10,");
        assert_eq!(
            lines[2],
            "Acme,Modified,S1,\"Widget, large\",2,3,1,20,30,10,quantity: 2 → 3; total: 20 → 30"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        export_report_to_path(&sample_report(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Company,Status"));
    }

    #[test]
    fn unwritable_path_is_write_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        let err = export_report_to_path(&sample_report(), &path).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }
}
