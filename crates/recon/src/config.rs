use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Rounding precision used when nothing else is configured.
pub const DEFAULT_PRECISION: u32 = 2;

/// Highest rounding precision accepted by validation.
pub const MAX_PRECISION: u32 = 6;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every section is optional: an empty document yields [`ReconConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub columns: ColumnMapping,
    pub decode: DecodeConfig,
    pub aggregate: AggregateConfig,
    pub compare: CompareConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Normalized header names the engine reads from each record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub company: String,
    pub sku: String,
    pub description: String,
    pub category: String,
    pub quantity: String,
    pub price: String,
    pub subtotal: String,
    pub total: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            company: "company_name".into(),
            sku: "sku".into(),
            description: "description".into(),
            category: "type".into(),
            quantity: "quantity".into(),
            price: "price".into(),
            subtotal: "subtotal".into(),
            total: "total".into(),
        }
    }
}

impl ColumnMapping {
    /// (role, column) pairs in a stable order, for validation and `inspect`.
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("company", &self.company),
            ("sku", &self.sku),
            ("description", &self.description),
            ("category", &self.category),
            ("quantity", &self.quantity),
            ("price", &self.price),
            ("subtotal", &self.subtotal),
            ("total", &self.total),
        ]
    }

    /// Header names are lower-cased and trimmed on load, so mapped names are too.
    fn normalize(&mut self) {
        for name in [
            &mut self.company,
            &mut self.sku,
            &mut self.description,
            &mut self.category,
            &mut self.quantity,
            &mut self.price,
            &mut self.subtotal,
            &mut self.total,
        ] {
            *name = name.trim().to_lowercase();
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub delimiter: Delimiter,
}

/// Field delimiter: a single ASCII character, or `"auto"` to sniff it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Delimiter {
    Auto,
    Byte(u8),
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::Byte(b',')
    }
}

impl Delimiter {
    /// Resolve to a concrete byte, sniffing `raw` when set to `Auto`.
    pub fn resolve(&self, raw: &str) -> u8 {
        match self {
            Self::Auto => crate::decode::sniff_delimiter(raw),
            Self::Byte(b) => *b,
        }
    }
}

impl TryFrom<String> for Delimiter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        if value == "\\t" || value.eq_ignore_ascii_case("tab") {
            return Ok(Self::Byte(b'\t'));
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => {
                Ok(Self::Byte(c as u8))
            }
            _ => Err(format!(
                "delimiter must be a single ASCII character or \"auto\", got {value:?}"
            )),
        }
    }
}

impl From<Delimiter> for String {
    fn from(value: Delimiter) -> Self {
        match value {
            Delimiter::Auto => "auto".into(),
            Delimiter::Byte(b'\t') => "\\t".into(),
            Delimiter::Byte(b) => (b as char).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateConfig {
    /// Item key used when a record's SKU is missing or blank.
    pub missing_sku: String,
    /// Categories whose descriptions override others, highest priority first.
    pub authoritative_categories: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            missing_sku: "NO-SKU".into(),
            authoritative_categories: vec!["subscription".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Decimal places numeric measures are rounded to before comparison.
    pub precision: u32,
    /// Cosmetic description annotations removed before comparison.
    pub annotation_pattern: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            annotation_pattern: r"\[options:.*?\]".into(),
        }
    }
}

impl CompareConfig {
    /// Precision capped at [`MAX_PRECISION`], for configs built in code
    /// without [`ReconConfig::validate`].
    pub fn effective_precision(&self) -> u32 {
        self.precision.min(MAX_PRECISION)
    }

    pub fn annotation_regex(&self) -> Result<Option<Regex>, ReconError> {
        if self.annotation_pattern.is_empty() {
            return Ok(None);
        }
        Regex::new(&self.annotation_pattern).map(Some).map_err(|e| {
            ReconError::ConfigValidation(format!(
                "compare.annotation_pattern {:?}: {e}",
                self.annotation_pattern
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Label shown for records with an empty account field.
    pub no_company_label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { no_company_label: "(No Company)".into() }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.columns.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (role, column) in self.columns.entries() {
            if column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{role} must not be empty"
                )));
            }
        }

        if self.compare.precision > MAX_PRECISION {
            return Err(ReconError::ConfigValidation(format!(
                "compare.precision must be at most {MAX_PRECISION}, got {}",
                self.compare.precision
            )));
        }

        if self
            .aggregate
            .authoritative_categories
            .iter()
            .any(|c| c.trim().is_empty())
        {
            return Err(ReconError::ConfigValidation(
                "aggregate.authoritative_categories must not contain empty entries".into(),
            ));
        }

        self.compare.annotation_regex()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
