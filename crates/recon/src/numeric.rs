// Numeric coercion for billing measures.
// Exports are messy: a field counts as the number it starts with, or zero.
// Currency symbols, thousands separators and parenthesized negatives are not
// interpreted.

/// What a numeric field yielded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    /// Blank field.
    Empty,
    /// The whole field is a number.
    Exact(f64),
    /// A leading number followed by other text (`"10 USD"` → 10).
    Partial(f64),
    /// No leading number at all.
    Invalid,
}

impl Parsed {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Exact(v) | Self::Partial(v) => Some(v),
            Self::Empty | Self::Invalid => None,
        }
    }

    /// Non-empty text that was not entirely a number.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Partial(_) | Self::Invalid)
    }
}

/// Classify a field by its longest leading decimal literal:
/// optional sign, digits with at most one `.`, optional exponent.
/// Non-finite results (`1e999`) are `Invalid`.
pub fn parse(s: &str) -> Parsed {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Parsed::Empty;
    }

    let prefix = numeric_prefix(trimmed);
    if prefix.is_empty() {
        return Parsed::Invalid;
    }
    match prefix.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            // -0 counts as 0
            let v = if v == 0.0 { 0.0 } else { v };
            if prefix.len() == trimmed.len() {
                Parsed::Exact(v)
            } else {
                Parsed::Partial(v)
            }
        }
        _ => Parsed::Invalid,
    }
}

/// Longest prefix of `s` that is a decimal literal, or `""`.
fn numeric_prefix(s: &str) -> &str {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < b.len() && b[i] == b'.' {
        let mut j = i + 1;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        let frac = j - (i + 1);
        if digits + frac > 0 {
            i = j;
            digits += frac;
        }
    }
    if digits == 0 {
        return "";
    }

    // Exponent only counts when at least one digit follows
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    &s[..i]
}

/// The number a field starts with, if any.
pub fn parse_number(s: &str) -> Option<f64> {
    parse(s).value()
}

/// Parse or fall back to zero.
pub fn coerce(s: &str) -> f64 {
    parse_number(s).unwrap_or(0.0)
}

/// Round half away from zero to `places` decimals. Never returns `-0.0`.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Render a number without trailing zeros (`20` not `20.0`, `20.5` not `20.50`).
pub fn format_number(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic() {
        assert_eq!(parse_number("123.45"), Some(123.45));
        assert_eq!(parse_number("-50"), Some(-50.0));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("+7"), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1.5e2"), Some(150.0));
    }

    #[test]
    fn leading_number_wins() {
        assert_eq!(coerce("10 USD"), 10.0);
        assert_eq!(coerce("12abc"), 12.0);
        assert_eq!(coerce("1,234"), 1.0);
        assert_eq!(coerce("3.5.1"), 3.5);
        assert_eq!(coerce("2e"), 2.0);
        assert_eq!(coerce("2e+x"), 2.0);
        assert_eq!(parse("10 USD"), Parsed::Partial(10.0));
    }

    #[test]
    fn currency_notation_is_not_interpreted() {
        assert_eq!(coerce("$1,234.50"), 0.0);
        assert_eq!(coerce("(5)"), 0.0);
        assert_eq!(parse("$685.00"), Parsed::Invalid);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert_eq!(parse(""), Parsed::Empty);
        assert_eq!(parse("   "), Parsed::Empty);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("-.e5"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn lossy_classification() {
        assert!(!parse("").is_lossy());
        assert!(!parse(" 2.5 ").is_lossy());
        assert!(parse("2.5x").is_lossy());
        assert!(parse("x").is_lossy());
    }

    #[test]
    fn coerce_defaults_to_zero() {
        assert_eq!(coerce("abc"), 0.0);
        assert_eq!(coerce(""), 0.0);
        assert_eq!(coerce(" 2.5 "), 2.5);
        assert!(coerce("-0").is_sign_positive());
    }

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_to(10.001, 2), 10.0);
        assert_eq!(round_to(10.004, 2), 10.0);
        assert_eq!(round_to(10.016, 2), 10.02);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.1 + 0.2, 2), 0.3);
    }

    #[test]
    fn round_never_negative_zero() {
        let r = round_to(-0.001, 2);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(20.5), "20.5");
        assert_eq!(format_number(-0.0), "0");
    }
}
