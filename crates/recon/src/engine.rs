use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;

use crate::aggregate::{build_hierarchy, AccountGroup, AggregatedItem, Hierarchy};
use crate::config::{ReconConfig, MAX_PRECISION};
use crate::error::ReconError;
use crate::group::AccountKey;
use crate::materialize::{load_dataset, Dataset};
use crate::model::{
    ChangedField, CompanyDiff, DiffEntry, DiffMeta, DiffResult, DiffStatus, FieldChange,
    FieldValue,
};
use crate::numeric::round_to;
use crate::summary::compute_counts;

/// Decode, materialize, aggregate, and diff two raw inputs.
pub fn run(
    label_a: &str,
    raw_a: &str,
    label_b: &str,
    raw_b: &str,
    config: &ReconConfig,
) -> Result<DiffResult, ReconError> {
    let a = load_dataset(label_a, raw_a, &config.decode)?;
    let b = load_dataset(label_b, raw_b, &config.decode)?;
    Ok(diff_datasets(&a, &b, config))
}

/// Diff two already materialized datasets.
pub fn diff_datasets(a: &Dataset, b: &Dataset, config: &ReconConfig) -> DiffResult {
    let a = build_hierarchy(a, config);
    let b = build_hierarchy(b, config);
    diff(&a, &b, config)
}

/// Classify every (account, item) key in the union of both hierarchies.
pub fn diff(a: &Hierarchy, b: &Hierarchy, config: &ReconConfig) -> DiffResult {
    let comparator = Comparator::new(config);

    let keys: BTreeSet<&AccountKey> = a.accounts.keys().chain(b.accounts.keys()).collect();
    let companies: Vec<CompanyDiff> = keys
        .into_iter()
        .map(|key| diff_account(key, a.get(key), b.get(key), &comparator, config))
        .collect();

    let counts = compute_counts(&companies);
    log::info!(
        "compared '{}' with '{}': {} item(s) across {} account(s); {} modified, {} added, {} removed",
        a.label,
        b.label,
        counts.total,
        counts.companies,
        counts.modified,
        counts.added,
        counts.removed
    );

    let mut warnings = a.warnings.clone();
    warnings.extend(b.warnings.iter().cloned());

    DiffResult {
        meta: DiffMeta {
            label_a: a.label.clone(),
            label_b: b.label.clone(),
            precision: comparator.precision,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        counts,
        companies,
        warnings,
    }
}

fn diff_account(
    key: &AccountKey,
    a: Option<&AccountGroup>,
    b: Option<&AccountGroup>,
    comparator: &Comparator,
    config: &ReconConfig,
) -> CompanyDiff {
    let mut entries = Vec::new();

    // A's items in first-appearance order, then B-only items in B's order
    if let Some(a) = a {
        for item in a.items.iter() {
            let other = b.and_then(|b| b.items.get(&item.sku));
            entries.push(match other {
                Some(other) => comparator.compare(item, other),
                None => DiffEntry {
                    status: DiffStatus::Removed,
                    sku: item.sku.clone(),
                    a: Some(Arc::clone(item)),
                    b: None,
                    changes: Vec::new(),
                },
            });
        }
    }
    if let Some(b) = b {
        for item in b.items.iter() {
            if a.is_some_and(|a| a.items.contains(&item.sku)) {
                continue;
            }
            entries.push(DiffEntry {
                status: DiffStatus::Added,
                sku: item.sku.clone(),
                a: None,
                b: Some(Arc::clone(item)),
                changes: Vec::new(),
            });
        }
    }

    let label = b.or(a).map(|g| g.label.as_str()).unwrap_or("");
    let name = if label.is_empty() {
        config.display.no_company_label.clone()
    } else {
        label.to_string()
    };
    let has_changes = entries.iter().any(|e| e.status != DiffStatus::Unchanged);

    log::debug!(
        "account {:?}: {} item(s), {}",
        name,
        entries.len(),
        if has_changes { "has changes" } else { "no changes" }
    );

    CompanyDiff {
        name,
        key: key.clone(),
        entries,
        has_changes,
        total_a: a.map(|g| g.total).unwrap_or(0.0),
        total_b: b.map(|g| g.total).unwrap_or(0.0),
    }
}

/// Field-level comparison of two aggregates of the same item key.
struct Comparator {
    precision: u32,
    annotation: Option<Regex>,
}

impl Comparator {
    fn new(config: &ReconConfig) -> Self {
        let annotation = match config.compare.annotation_regex() {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("{e}; descriptions compared verbatim");
                None
            }
        };
        let precision = config.compare.effective_precision();
        if precision != config.compare.precision {
            log::warn!(
                "compare.precision {} exceeds {}; rounding to {} places",
                config.compare.precision,
                MAX_PRECISION,
                precision
            );
        }
        Self { precision, annotation }
    }

    fn strip<'a>(&self, description: &'a str) -> Cow<'a, str> {
        match &self.annotation {
            Some(regex) => match regex.replace_all(description, "") {
                Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
                Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
            },
            None => Cow::Borrowed(description.trim()),
        }
    }

    fn compare(&self, a: &Arc<AggregatedItem>, b: &Arc<AggregatedItem>) -> DiffEntry {
        let mut changes = Vec::new();

        for (field, va, vb) in [
            (ChangedField::Quantity, a.quantity, b.quantity),
            (ChangedField::Subtotal, a.subtotal, b.subtotal),
            (ChangedField::Total, a.total, b.total),
        ] {
            let ra = round_to(va, self.precision);
            let rb = round_to(vb, self.precision);
            if ra != rb {
                changes.push(FieldChange {
                    field,
                    a: FieldValue::Number(ra),
                    b: FieldValue::Number(rb),
                });
            }
        }

        if self.strip(&a.description) != self.strip(&b.description) {
            changes.push(FieldChange {
                field: ChangedField::Description,
                a: FieldValue::Text(a.description.clone()),
                b: FieldValue::Text(b.description.clone()),
            });
        }

        DiffEntry {
            status: if changes.is_empty() {
                DiffStatus::Unchanged
            } else {
                DiffStatus::Modified
            },
            sku: a.sku.clone(),
            a: Some(Arc::clone(a)),
            b: Some(Arc::clone(b)),
            changes,
        }
    }
}
