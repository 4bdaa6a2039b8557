use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::materialize::RawRecord;

/// Normalized account identifier: trimmed and upper-cased.
///
/// Used only for matching; display labels are kept separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for records with a missing or blank account field.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Records for one account, in original order.
#[derive(Debug, Clone, Default)]
pub struct AccountRecords {
    /// First encountered original (trimmed) account label.
    pub label: String,
    pub records: Vec<Arc<RawRecord>>,
}

/// Partition records by normalized account key, preserving record order.
pub fn group_by_account(
    records: &[Arc<RawRecord>],
    column: &str,
) -> BTreeMap<AccountKey, AccountRecords> {
    let mut groups: BTreeMap<AccountKey, AccountRecords> = BTreeMap::new();

    for record in records {
        let raw = record.value(column);
        let entry = groups
            .entry(AccountKey::normalize(raw))
            .or_insert_with(|| AccountRecords {
                label: raw.trim().to_string(),
                records: Vec::new(),
            });
        entry.records.push(Arc::clone(record));
    }

    groups
}
