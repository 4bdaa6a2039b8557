// Delimited text → grid of trimmed string rows.
// Total over any input: bad quoting stays open until EOF, nothing raises.

/// Decode `raw` into rows of trimmed fields.
///
/// Quoted fields may contain the delimiter, newlines, and doubled quotes.
/// Only a quote that opens a field starts quoting, and an unclosed one runs to
/// end of input; a quote in the middle of an unquoted field is kept literally.
/// LF and CRLF terminate rows identically, and a final row without a
/// terminator is kept. Rows whose fields are all blank are dropped. Rows keep
/// their own length; short rows are padded later by the materializer.
pub fn decode(raw: &str, delimiter: u8) -> Vec<Vec<String>> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping undecodable record {}: {e}", idx + 1);
                continue;
            }
        };

        let row: Vec<String> = record.iter().map(|field| field.trim().to_string()).collect();
        if row.iter().all(|field| field.is_empty()) {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }

    log::debug!(
        "decoded {} row(s), dropped {} blank row(s), delimiter {:?}",
        rows.len(),
        dropped,
        delimiter as char
    );
    rows
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins. Defaults to comma.
pub fn sniff_delimiter(raw: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines with the same field count as line 1) * field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn simple_rows() {
        let rows = decode("a,b,c\n1,2,3\n", b',');
        assert_eq!(rows, grid(&[&["a", "b", "c"], &["1", "2", "3"]]));
    }

    #[test]
    fn quoted_field_with_newline_and_escaped_quote() {
        let rows = decode("a,\"b\nc \"\"x\"\"\",d\n", b',');
        assert_eq!(rows, grid(&[&["a", "b\nc \"x\"", "d"]]));
    }

    #[test]
    fn quoted_delimiter() {
        let rows = decode("name,desc\nAcme,\"Widget, large\"\n", b',');
        assert_eq!(rows[1], vec!["Acme", "Widget, large"]);
    }

    #[test]
    fn crlf_matches_lf() {
        let lf = decode("a,b\n1,2\n3,4\n", b',');
        let crlf = decode("a,b\r\n1,2\r\n3,4\r\n", b',');
        assert_eq!(lf, crlf);
    }

    #[test]
    fn trailing_line_without_terminator() {
        let rows = decode("a,b\n1,2", b',');
        assert_eq!(rows, grid(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn blank_rows_dropped() {
        let rows = decode("a,b\n\n , \n,\n1,2\n", b',');
        assert_eq!(rows, grid(&[&["a", "b"], &["1", "2"]]));
    }

    #[test]
    fn ragged_rows_kept() {
        let rows = decode("a,b,c\n1\n1,2,3,4\n", b',');
        assert_eq!(rows[1], vec!["1"]);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn unterminated_quote_runs_to_eof() {
        let rows = decode("a,b\n1,\"open,still\nopen", b',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "1");
        assert_eq!(rows[1][1], "open,still\nopen");
    }

    #[test]
    fn midfield_quote_is_literal() {
        let rows = decode("a,b\n1,ab\"c,d\n2,3\n", b',');
        assert_eq!(rows, grid(&[&["a", "b"], &["1", "ab\"c", "d"], &["2", "3"]]));
    }

    #[test]
    fn fields_are_trimmed() {
        let rows = decode("  a , b \n\" padded \",x\n", b',');
        assert_eq!(rows, grid(&[&["a", "b"], &["padded", "x"]]));
    }

    #[test]
    fn bom_stripped() {
        let rows = decode("\u{feff}company_name,sku\nAcme,S1\n", b',');
        assert_eq!(rows[0][0], "company_name");
    }

    #[test]
    fn empty_input() {
        assert!(decode("", b',').is_empty());
        assert!(decode("\n\n\r\n", b',').is_empty());
    }

    #[test]
    fn sniff_candidates() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b\n1|2\n"), b'|');
        assert_eq!(sniff_delimiter("single\ncolumn\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn sniff_ignores_commas_inside_semicolon_data() {
        let raw = "company;total\nAcme, Inc.;1,50\nBeta;2,00\n";
        assert_eq!(sniff_delimiter(raw), b';');
    }
}
