use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedItem;
use crate::group::AccountKey;
use crate::numeric::format_number;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which of the two datasets a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }

    /// Capitalised form used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Modified => "Modified",
            Self::Unchanged => "Unchanged",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field changes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Quantity,
    Subtotal,
    Total,
    Description,
}

impl ChangedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::Subtotal => "subtotal",
            Self::Total => "total",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One differing field between the A and B aggregates of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: ChangedField,
    pub a: FieldValue,
    pub b: FieldValue,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.field, self.a, self.b)
    }
}

// ---------------------------------------------------------------------------
// Per-item / per-account results
// ---------------------------------------------------------------------------

/// Comparison of one item key within one account.
///
/// `added` has only `b`, `removed` has only `a`, the others have both.
#[derive(Debug, Clone, Serialize)]
pub struct DiffEntry {
    pub status: DiffStatus,
    pub sku: String,
    pub a: Option<Arc<AggregatedItem>>,
    pub b: Option<Arc<AggregatedItem>>,
    pub changes: Vec<FieldChange>,
}

impl DiffEntry {
    /// B's description, falling back to A's.
    pub fn description(&self) -> &str {
        self.b
            .as_ref()
            .or(self.a.as_ref())
            .map(|item| item.description.as_str())
            .unwrap_or("")
    }

    pub fn changed(&self, field: ChangedField) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDiff {
    pub name: String,
    pub key: AccountKey,
    pub entries: Vec<DiffEntry>,
    pub has_changes: bool,
    pub total_a: f64,
    pub total_b: f64,
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A non-empty numeric field that could not be parsed and was counted as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoercionWarning {
    pub dataset: String,
    pub account: String,
    pub sku: String,
    pub row: usize,
    pub field: String,
    pub value: String,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row {}: {} {:?} is not a number (account {:?}, sku {:?}); counted as 0",
            self.dataset, self.row, self.field, self.value, self.account, self.sku
        )
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Roll-up tallies across every item of every account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub total: usize,
    pub unchanged: usize,
    pub modified: usize,
    pub added: usize,
    pub removed: usize,
    pub companies: usize,
    pub companies_changed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffMeta {
    pub label_a: String,
    pub label_b: String,
    pub precision: u32,
    pub engine_version: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub meta: DiffMeta,
    pub counts: DiffCounts,
    pub companies: Vec<CompanyDiff>,
    pub warnings: Vec<CoercionWarning>,
}

impl DiffResult {
    /// True when anything was added, removed, or modified.
    pub fn has_differences(&self) -> bool {
        self.counts.added + self.counts.removed + self.counts.modified > 0
    }
}
