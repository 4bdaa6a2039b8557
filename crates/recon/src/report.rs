//! Flat, export-ready view of a [`DiffResult`].
//!
//! Each account yields one summary row followed by one row per item entry.
//! Every exporter (CSV, JSON, XLSX) consumes this shape.

use std::fmt;

use serde::Serialize;

use crate::model::{DiffCounts, DiffEntry, DiffResult, DiffStatus};
use crate::numeric::{format_number, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    #[serde(rename = "HAS CHANGES")]
    HasChanges,
    #[serde(rename = "NO CHANGES")]
    NoChanges,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasChanges => "HAS CHANGES",
            Self::NoChanges => "NO CHANGES",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRow {
    pub company: String,
    pub status: AccountStatus,
    pub total_a: f64,
    pub total_b: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub company: String,
    pub status: DiffStatus,
    pub sku: String,
    pub description: String,
    pub quantity_a: Option<f64>,
    pub quantity_b: Option<f64>,
    /// Only when the item exists on both sides.
    pub quantity_change: Option<f64>,
    pub total_a: Option<f64>,
    pub total_b: Option<f64>,
    /// A missing side counts as 0.
    pub total_change: f64,
    pub changes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRow {
    Account(AccountRow),
    Item(ItemRow),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub counts: DiffCounts,
    pub label_a: String,
    pub label_b: String,
    pub generated_at: String,
}

/// A value in [`Report::summary_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryValue {
    Count(usize),
    Text(String),
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    /// Drop unchanged entries and accounts left with none.
    pub changes_only: bool,
}

pub fn flatten(result: &DiffResult) -> Report {
    flatten_with(result, FlattenOptions::default())
}

pub fn flatten_with(result: &DiffResult, options: FlattenOptions) -> Report {
    let precision = result.meta.precision;
    let round = |v: f64| round_to(v, precision);
    let mut rows = Vec::new();

    for company in &result.companies {
        let entries: Vec<&DiffEntry> = company
            .entries
            .iter()
            .filter(|e| !options.changes_only || e.status != DiffStatus::Unchanged)
            .collect();
        if options.changes_only && entries.is_empty() {
            continue;
        }

        rows.push(ReportRow::Account(AccountRow {
            company: company.name.clone(),
            status: if company.has_changes {
                AccountStatus::HasChanges
            } else {
                AccountStatus::NoChanges
            },
            total_a: round(company.total_a),
            total_b: round(company.total_b),
            difference: round(company.total_b - company.total_a),
        }));

        for entry in entries {
            let qa = entry.a.as_ref().map(|i| i.quantity);
            let qb = entry.b.as_ref().map(|i| i.quantity);
            let ta = entry.a.as_ref().map(|i| i.total);
            let tb = entry.b.as_ref().map(|i| i.total);

            rows.push(ReportRow::Item(ItemRow {
                company: company.name.clone(),
                status: entry.status,
                sku: entry.sku.clone(),
                description: entry.description().to_string(),
                quantity_a: qa.map(round),
                quantity_b: qb.map(round),
                quantity_change: qa.zip(qb).map(|(a, b)| round(b - a)),
                total_a: ta.map(round),
                total_b: tb.map(round),
                total_change: round(tb.unwrap_or(0.0) - ta.unwrap_or(0.0)),
                changes: entry
                    .changes
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            }));
        }
    }

    Report {
        summary: ReportSummary {
            counts: result.counts.clone(),
            label_a: result.meta.label_a.clone(),
            label_b: result.meta.label_b.clone(),
            generated_at: result.meta.generated_at.clone(),
        },
        rows,
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

impl Report {
    pub const HEADERS: [&'static str; 11] = [
        "Company",
        "Status",
        "SKU",
        "Description",
        "Qty (A)",
        "Qty (B)",
        "Qty Change",
        "Total (A)",
        "Total (B)",
        "Total Change",
        "Changes",
    ];

    /// Header row plus one string row per report row.
    pub fn to_table(&self) -> Vec<Vec<String>> {
        let mut table = Vec::with_capacity(self.rows.len() + 1);
        table.push(Self::HEADERS.iter().map(|h| h.to_string()).collect());
        for row in &self.rows {
            table.push(match row {
                ReportRow::Account(r) => vec![
                    r.company.clone(),
                    r.status.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    format_number(r.total_a),
                    format_number(r.total_b),
                    format_number(r.difference),
                    String::new(),
                ],
                ReportRow::Item(r) => vec![
                    r.company.clone(),
                    r.status.label().to_string(),
                    r.sku.clone(),
                    r.description.clone(),
                    cell(r.quantity_a),
                    cell(r.quantity_b),
                    cell(r.quantity_change),
                    cell(r.total_a),
                    cell(r.total_b),
                    format_number(r.total_change),
                    r.changes.clone(),
                ],
            });
        }
        table
    }

    /// The summary block as labelled sections, in display order: item counts,
    /// company counts, then provenance.
    pub fn summary_table(&self) -> Vec<Vec<(&'static str, SummaryValue)>> {
        let s = &self.summary;
        let c = &s.counts;
        vec![
            vec![
                ("Total SKU Lines", SummaryValue::Count(c.total)),
                ("Unchanged", SummaryValue::Count(c.unchanged)),
                ("Modified", SummaryValue::Count(c.modified)),
                ("Added in B", SummaryValue::Count(c.added)),
                ("Removed from A", SummaryValue::Count(c.removed)),
            ],
            vec![
                ("Companies", SummaryValue::Count(c.companies)),
                ("Companies with Changes", SummaryValue::Count(c.companies_changed)),
            ],
            vec![
                ("File A", SummaryValue::Text(s.label_a.clone())),
                ("File B", SummaryValue::Text(s.label_b.clone())),
                ("Generated", SummaryValue::Text(s.generated_at.clone())),
            ],
        ]
    }
}
