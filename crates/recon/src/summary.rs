use crate::model::{CompanyDiff, DiffCounts, DiffStatus};

/// Compute roll-up counts from per-account results.
pub fn compute_counts(companies: &[CompanyDiff]) -> DiffCounts {
    let mut counts = DiffCounts {
        companies: companies.len(),
        ..DiffCounts::default()
    };

    for company in companies {
        if company.has_changes {
            counts.companies_changed += 1;
        }
        for entry in &company.entries {
            counts.total += 1;
            match entry.status {
                DiffStatus::Unchanged => counts.unchanged += 1,
                DiffStatus::Modified => counts.modified += 1,
                DiffStatus::Added => counts.added += 1,
                DiffStatus::Removed => counts.removed += 1,
            }
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::AccountKey;
    use crate::model::DiffEntry;

    fn entry(status: DiffStatus) -> DiffEntry {
        DiffEntry {
            status,
            sku: "S".into(),
            a: None,
            b: None,
            changes: Vec::new(),
        }
    }

    fn company(name: &str, statuses: &[DiffStatus]) -> CompanyDiff {
        let entries: Vec<DiffEntry> = statuses.iter().map(|&s| entry(s)).collect();
        CompanyDiff {
            name: name.into(),
            key: AccountKey::normalize(name),
            has_changes: entries.iter().any(|e| e.status != DiffStatus::Unchanged),
            entries,
            total_a: 0.0,
            total_b: 0.0,
        }
    }

    #[test]
    fn counts_by_status() {
        let companies = vec![
            company("Acme", &[DiffStatus::Unchanged, DiffStatus::Modified, DiffStatus::Added]),
            company("Beta", &[DiffStatus::Unchanged, DiffStatus::Unchanged]),
            company("Gamma", &[DiffStatus::Removed]),
        ];
        let counts = compute_counts(&companies);
        assert_eq!(counts.total, 6);
        assert_eq!(counts.unchanged, 3);
        assert_eq!(counts.modified, 1);
        assert_eq!(counts.added, 1);
        assert_eq!(counts.removed, 1);
        assert_eq!(counts.companies, 3);
        assert_eq!(counts.companies_changed, 2);
        assert_eq!(
            counts.total,
            counts.unchanged + counts.modified + counts.added + counts.removed
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(compute_counts(&[]), DiffCounts::default());
    }
}
