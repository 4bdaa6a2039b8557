use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ColumnMapping, ReconConfig};
use crate::group::{group_by_account, AccountKey};
use crate::materialize::{Dataset, RawRecord};
use crate::model::CoercionWarning;
use crate::numeric::{coerce, parse};

// ---------------------------------------------------------------------------
// Aggregated items
// ---------------------------------------------------------------------------

/// All records sharing one (account, item) key, folded into one comparable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedItem {
    pub sku: String,
    pub description: String,
    pub category: String,
    pub quantity: f64,
    pub subtotal: f64,
    pub total: f64,
    /// Most recent non-empty unit price among contributing records. Price is
    /// informational and never compared, so the latest row's price is the
    /// best guide to the current rate regardless of category.
    pub price: String,
    /// Contributing records in arrival order.
    pub lines: Vec<Arc<RawRecord>>,
}

/// Items of one account, in first-appearance order with a key index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountItems {
    items: Vec<Arc<AggregatedItem>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AccountItems {
    pub fn get(&self, sku: &str) -> Option<&Arc<AggregatedItem>> {
        self.index.get(sku).map(|&i| &self.items[i])
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.index.contains_key(sku)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AggregatedItem>> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.sku.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Description merge rule
// ---------------------------------------------------------------------------

/// What to do with an incoming record's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Keep,
    /// Authoritative source: replace description and category.
    Override,
    /// Current description is empty: take the incoming one.
    Backfill,
}

/// Ranked description merge.
///
/// Categories listed as authoritative rank by position (first is highest);
/// everything else ranks 0. A ranked record with a description replaces any
/// description of equal or lower rank, so the last one seen wins among
/// equals. An unranked record only fills an empty description.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionRule<'a> {
    authoritative: &'a [String],
}

impl<'a> DescriptionRule<'a> {
    pub fn new(authoritative: &'a [String]) -> Self {
        Self { authoritative }
    }

    pub fn rank(&self, category: &str) -> usize {
        self.authoritative
            .iter()
            .position(|c| c == category)
            .map(|i| self.authoritative.len() - i)
            .unwrap_or(0)
    }

    pub fn merge(
        &self,
        current_rank: usize,
        current_description: &str,
        incoming_rank: usize,
        incoming_description: &str,
    ) -> Merge {
        if incoming_description.is_empty() {
            Merge::Keep
        } else if incoming_rank > 0 && incoming_rank >= current_rank {
            Merge::Override
        } else if current_description.is_empty() {
            Merge::Backfill
        } else {
            Merge::Keep
        }
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

struct ItemFold {
    item: AggregatedItem,
    rank: usize,
}

impl ItemFold {
    fn seed(sku: String, record: &RawRecord, columns: &ColumnMapping, rule: &DescriptionRule) -> Self {
        let description = record.value(&columns.description).to_string();
        let category = record.value(&columns.category).to_string();
        let rank = if description.is_empty() { 0 } else { rule.rank(&category) };
        Self {
            item: AggregatedItem {
                sku,
                description,
                category,
                quantity: 0.0,
                subtotal: 0.0,
                total: 0.0,
                price: record.value(&columns.price).to_string(),
                lines: Vec::new(),
            },
            rank,
        }
    }

    fn absorb(&mut self, record: &Arc<RawRecord>, columns: &ColumnMapping, rule: &DescriptionRule) {
        let item = &mut self.item;
        item.quantity += coerce(record.value(&columns.quantity));
        item.subtotal += coerce(record.value(&columns.subtotal));
        item.total += coerce(record.value(&columns.total));
        item.lines.push(Arc::clone(record));

        let price = record.value(&columns.price);
        if !price.is_empty() {
            item.price = price.to_string();
        }

        let category = record.value(&columns.category);
        let description = record.value(&columns.description);
        let incoming_rank = rule.rank(category);
        match rule.merge(self.rank, &item.description, incoming_rank, description) {
            Merge::Keep => {}
            Merge::Override => {
                item.description = description.to_string();
                item.category = category.to_string();
                self.rank = incoming_rank;
            }
            Merge::Backfill => {
                item.description = description.to_string();
                self.rank = incoming_rank;
            }
        }
    }
}

/// Item key for a record: trimmed SKU, or the sentinel when missing or blank.
pub fn item_key(record: &RawRecord, config: &ReconConfig) -> String {
    let sku = record.value(&config.columns.sku).trim();
    if sku.is_empty() {
        config.aggregate.missing_sku.clone()
    } else {
        sku.to_string()
    }
}

/// Fold one account's records into items keyed by SKU.
pub fn aggregate_items(records: &[Arc<RawRecord>], config: &ReconConfig) -> AccountItems {
    let columns = &config.columns;
    let rule = DescriptionRule::new(&config.aggregate.authoritative_categories);

    let mut folds: Vec<ItemFold> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let sku = item_key(record, config);
        let slot = match index.get(&sku) {
            Some(&slot) => slot,
            None => {
                folds.push(ItemFold::seed(sku.clone(), record, columns, &rule));
                index.insert(sku, folds.len() - 1);
                folds.len() - 1
            }
        };
        folds[slot].absorb(record, columns, &rule);
    }

    AccountItems {
        items: folds.into_iter().map(|f| Arc::new(f.item)).collect(),
        index,
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// One account within one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct AccountGroup {
    pub key: AccountKey,
    pub label: String,
    pub items: AccountItems,
    /// Sum of the total measure over the account's raw records.
    pub total: f64,
    pub record_count: usize,
}

/// Account → item hierarchy for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    pub label: String,
    pub accounts: BTreeMap<AccountKey, AccountGroup>,
    pub warnings: Vec<CoercionWarning>,
}

impl Hierarchy {
    pub fn get(&self, key: &AccountKey) -> Option<&AccountGroup> {
        self.accounts.get(key)
    }
}

/// Group and aggregate a whole dataset.
pub fn build_hierarchy(dataset: &Dataset, config: &ReconConfig) -> Hierarchy {
    let total_column = &config.columns.total;
    let accounts: BTreeMap<AccountKey, AccountGroup> =
        group_by_account(&dataset.records, &config.columns.company)
            .into_iter()
            .map(|(key, grouped)| {
                let total = grouped
                    .records
                    .iter()
                    .map(|r| coerce(r.value(total_column)))
                    .sum();
                let group = AccountGroup {
                    key: key.clone(),
                    label: grouped.label,
                    items: aggregate_items(&grouped.records, config),
                    total,
                    record_count: grouped.records.len(),
                };
                (key, group)
            })
            .collect();

    let warnings = collect_warnings(dataset, config);
    if !warnings.is_empty() {
        log::warn!(
            "dataset '{}': {} non-numeric value(s) counted as 0",
            dataset.label,
            warnings.len()
        );
    }
    for warning in &warnings {
        log::debug!("{warning}");
    }

    log::debug!(
        "dataset '{}': {} account(s), {} item(s), {} coercion warning(s)",
        dataset.label,
        accounts.len(),
        accounts.values().map(|a| a.items.len()).sum::<usize>(),
        warnings.len()
    );

    Hierarchy {
        label: dataset.label.clone(),
        accounts,
        warnings,
    }
}

/// Non-empty summed measures that do not parse as numbers.
pub fn collect_warnings(dataset: &Dataset, config: &ReconConfig) -> Vec<CoercionWarning> {
    let columns = &config.columns;
    let mut warnings = Vec::new();

    for record in &dataset.records {
        for field in [&columns.quantity, &columns.subtotal, &columns.total] {
            let value = record.value(field);
            if !parse(value).is_lossy() {
                continue;
            }
            warnings.push(CoercionWarning {
                dataset: dataset.label.clone(),
                account: record.value(&columns.company).trim().to_string(),
                sku: item_key(record, config),
                row: record.row,
                field: field.clone(),
                value: value.to_string(),
            });
        }
    }

    warnings
}
