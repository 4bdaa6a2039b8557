use thiserror::Error;

use crate::model::Side;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Decoded grid has no header row, or a header with no data rows.
    #[error("dataset '{label}': need a header row and at least one data row, found {rows} row(s)")]
    InsufficientData { label: String, rows: usize },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty column name, bad pattern, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Comparison requested before both datasets were loaded.
    #[error("dataset {0} has not been loaded")]
    MissingDataset(Side),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_dataset() {
        let err = ReconError::InsufficientData { label: "march.csv".into(), rows: 1 };
        let msg = err.to_string();
        assert!(msg.contains("march.csv"));
        assert!(msg.contains("1 row(s)"));
    }

    #[test]
    fn missing_dataset_names_side() {
        assert_eq!(ReconError::MissingDataset(Side::B).to_string(), "dataset B has not been loaded");
    }
}
