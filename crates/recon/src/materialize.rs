use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::config::DecodeConfig;
use crate::decode::decode;
use crate::error::ReconError;

/// One decoded data row keyed by normalized header name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    /// 1-based position among the dataset's data rows (header excluded).
    pub row: usize,
    pub fields: BTreeMap<String, String>,
}

impl RawRecord {
    /// Value of `field`, or `None` when the header has no such column.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|s| s.as_str())
    }

    /// Value of `field`, empty when the column is absent.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }
}

/// A materialized dataset: header names plus shared, immutable records.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub label: String,
    pub headers: Vec<String>,
    pub records: Vec<Arc<RawRecord>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Number of distinct trimmed account labels, or `None` without the column.
    pub fn company_count(&self, column: &str) -> Option<usize> {
        if !self.has_column(column) {
            return None;
        }
        let distinct: HashSet<&str> = self.records.iter().map(|r| r.value(column).trim()).collect();
        Some(distinct.len())
    }
}

/// Turn a decoded grid into a dataset. The first row names the fields.
pub fn materialize(label: &str, grid: Vec<Vec<String>>) -> Result<Dataset, ReconError> {
    if grid.len() < 2 {
        return Err(ReconError::InsufficientData {
            label: label.to_string(),
            rows: grid.len(),
        });
    }

    let mut rows = grid.into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|h| h.trim().to_lowercase()).collect(),
        None => Vec::new(),
    };

    let records: Vec<Arc<RawRecord>> = rows
        .enumerate()
        .map(|(idx, row)| {
            let mut fields = BTreeMap::new();
            for (col, name) in headers.iter().enumerate() {
                let value = row.get(col).map(|v| v.trim()).unwrap_or("");
                // Duplicate header names: the rightmost column wins
                fields.insert(name.clone(), value.to_string());
            }
            Arc::new(RawRecord { row: idx + 1, fields })
        })
        .collect();

    log::debug!(
        "dataset '{}': {} header(s), {} record(s)",
        label,
        headers.len(),
        records.len()
    );

    Ok(Dataset {
        label: label.to_string(),
        headers,
        records,
    })
}

/// Decode `raw` and materialize it in one step.
pub fn load_dataset(label: &str, raw: &str, config: &DecodeConfig) -> Result<Dataset, ReconError> {
    let delimiter = config.delimiter.resolve(raw);
    materialize(label, decode(raw, delimiter))
}
