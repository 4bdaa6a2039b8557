// Property-based tests for decoding, aggregation, and diff classification.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use billdiff_recon::aggregate::build_hierarchy;
use billdiff_recon::decode::decode;
use billdiff_recon::materialize::load_dataset;
use billdiff_recon::numeric::coerce;
use billdiff_recon::{run, DiffStatus, ReconConfig};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Plain encoder: fields joined as-is. Only valid for fields without
/// delimiter, quote, or line break.
fn encode_plain(grid: &[Vec<String>], newline: &str) -> String {
    grid.iter()
        .map(|row| row.join(","))
        .collect::<Vec<_>>()
        .join(newline)
}

/// Quoting encoder: every field quoted, inner quotes doubled.
fn encode_quoted(grid: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in grid {
        let fields: Vec<String> = row
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Field with no delimiter, quote, line break, or surrounding whitespace.
fn arb_plain_field() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => r"[A-Za-z0-9]([A-Za-z0-9 .$()-]{0,8}[A-Za-z0-9])?",
        1 => Just(String::new()),
    ]
}

/// Rows whose first field is non-empty so none are dropped as blank.
fn arb_plain_grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..6).prop_flat_map(|width| {
        proptest::collection::vec(
            (
                r"[A-Za-z0-9]{1,6}",
                proptest::collection::vec(arb_plain_field(), width - 1),
            )
                .prop_map(|(first, rest)| {
                    let mut row = vec![first];
                    row.extend(rest);
                    row
                }),
            1..12,
        )
    })
}

/// Field that needs quoting: may contain delimiter, quotes, and newlines.
fn arb_quoted_field() -> impl Strategy<Value = String> {
    r#"[A-Za-z0-9][A-Za-z0-9 ,"\n]{0,10}[A-Za-z0-9]"#
}

fn arb_quoted_grid() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|width| {
        proptest::collection::vec(proptest::collection::vec(arb_quoted_field(), width), 1..8)
    })
}

fn arb_amount() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => r"-?[0-9]{1,4}(\.[0-9]{1,2})?",
        1 => r"\$[0-9]{1,3},[0-9]{3}\.[0-9]{2}",
        1 => r"\([0-9]{1,3}\.[0-9]{2}\)",
        1 => r"[0-9]{1,3}(\.[0-9]{1,2})? [A-Z]{3}",
        1 => r"[a-z]{1,4}",
        1 => Just(String::new()),
    ]
}

/// (company, sku, total) line item drawn from small key spaces so groups collide.
fn arb_line() -> impl Strategy<Value = (String, String, String)> {
    (
        prop::sample::select(vec!["Acme", "acme ", "Beta", "GAMMA", ""]),
        prop::sample::select(vec!["S1", "S2", "s1", "S3", ""]),
        arb_amount(),
    )
        .prop_map(|(c, s, t)| (c.to_string(), s.to_string(), t))
}

fn arb_lines() -> impl Strategy<Value = Vec<(String, String, String)>> {
    proptest::collection::vec(arb_line(), 1..30)
}

fn to_csv(lines: &[(String, String, String)]) -> String {
    // The description column keeps every row non-blank
    let mut out = String::from("company_name,sku,description,total\n");
    for (i, (company, sku, total)) in lines.iter().enumerate() {
        out.push_str(&format!("{company},{sku},line {i},\"{total}\"\n"));
    }
    out
}

/// Expected (account key, item key) pairs for a set of lines.
fn key_pairs(lines: &[(String, String, String)]) -> BTreeSet<(String, String)> {
    lines
        .iter()
        .map(|(c, s, _)| {
            let sku = if s.trim().is_empty() { "NO-SKU" } else { s.trim() };
            (c.trim().to_uppercase(), sku.to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn plain_grid_round_trips(grid in arb_plain_grid(), crlf in prop::bool::ANY) {
        let newline = if crlf { "\r\n" } else { "\n" };
        let decoded = decode(&encode_plain(&grid, newline), b',');
        prop_assert_eq!(decoded, grid);
    }

    #[test]
    fn quoted_grid_round_trips(grid in arb_quoted_grid()) {
        let decoded = decode(&encode_quoted(&grid), b',');
        prop_assert_eq!(decoded, grid);
    }

    #[test]
    fn decode_never_panics(raw in r#"[a-z,"\n\r ]{0,64}"#) {
        let rows = decode(&raw, b',');
        for row in rows {
            prop_assert!(row.iter().any(|f| !f.is_empty()));
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn item_total_is_sum_of_its_lines(lines in arb_lines()) {
        let config = ReconConfig::default();
        let dataset = load_dataset("a", &to_csv(&lines), &config.decode).unwrap();
        let hierarchy = build_hierarchy(&dataset, &config);

        let mut seen_rows = Vec::new();
        for account in hierarchy.accounts.values() {
            let mut line_count = 0;
            for item in account.items.iter() {
                let from_lines: f64 = item.lines.iter().fold(0.0, |acc, l| acc + coerce(l.value("total")));
                prop_assert_eq!(item.total, from_lines, "item {}", &item.sku);
                seen_rows.extend(item.lines.iter().map(|l| l.row));
                line_count += item.lines.len();
            }
            prop_assert_eq!(line_count, account.record_count);
        }

        seen_rows.sort_unstable();
        let expected: Vec<usize> = (1..=lines.len()).collect();
        prop_assert_eq!(seen_rows, expected);
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_key_classified_exactly_once(a in arb_lines(), b in arb_lines()) {
        let result = run("a", &to_csv(&a), "b", &to_csv(&b), &ReconConfig::default()).unwrap();

        let keys_a = key_pairs(&a);
        let keys_b = key_pairs(&b);

        let mut found: BTreeMap<(String, String), DiffStatus> = BTreeMap::new();
        for company in &result.companies {
            for entry in &company.entries {
                let key = (company.key.to_string(), entry.sku.clone());
                prop_assert!(found.insert(key, entry.status).is_none(), "duplicate entry");
            }
        }

        let union: BTreeSet<(String, String)> = keys_a.union(&keys_b).cloned().collect();
        prop_assert_eq!(found.keys().cloned().collect::<BTreeSet<_>>(), union);

        for (key, status) in &found {
            let expected_side = (keys_a.contains(key), keys_b.contains(key));
            match expected_side {
                (true, false) => prop_assert_eq!(*status, DiffStatus::Removed),
                (false, true) => prop_assert_eq!(*status, DiffStatus::Added),
                _ => prop_assert!(matches!(status, DiffStatus::Modified | DiffStatus::Unchanged)),
            }
        }

        let c = &result.counts;
        prop_assert_eq!(c.total, found.len());
        prop_assert_eq!(c.total, c.unchanged + c.modified + c.added + c.removed);
    }

    #[test]
    fn self_diff_is_unchanged(lines in arb_lines()) {
        let raw = to_csv(&lines);
        let result = run("a", &raw, "a", &raw, &ReconConfig::default()).unwrap();

        prop_assert!(result.companies.iter().all(|c| !c.has_changes));
        prop_assert_eq!(result.counts.unchanged, result.counts.total);
        prop_assert_eq!(result.counts.companies_changed, 0);
    }
}
