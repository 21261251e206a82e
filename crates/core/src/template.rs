use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locale::NumberLocale;

/// What kind of account a statement belongs to. Credit-card inflows are
/// payments to the card, not income — the aggregator treats them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Credit,
    Debit,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Credit => write!(f, "credit"),
            AccountKind::Debit => write!(f, "debit"),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(AccountKind::Credit),
            "debit" => Ok(AccountKind::Debit),
            other => Err(format!("unknown account kind: '{other}'")),
        }
    }
}

/// Source document type a template applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Csv,
    Xlsx,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Pdf => write!(f, "pdf"),
            FileKind::Csv => write!(f, "csv"),
            FileKind::Xlsx => write!(f, "xlsx"),
        }
    }
}

impl std::str::FromStr for FileKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "csv" => Ok(FileKind::Csv),
            "xlsx" | "xls" => Ok(FileKind::Xlsx),
            other => Err(format!("unknown file kind: '{other}'")),
        }
    }
}

/// 1-based capture group indices mapping the extraction regex onto the three
/// transaction fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupMapping {
    pub date: usize,
    pub description: usize,
    pub value: usize,
}

impl Default for GroupMapping {
    fn default() -> Self {
        Self { date: 1, description: 2, value: 3 }
    }
}

/// Sign and inclusion rules baked into a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRules {
    /// When set, every extracted value is forced negative unless a positive
    /// pattern matches. Typical for credit-card statements that print
    /// purchases unsigned.
    #[serde(default)]
    pub default_negative: bool,
    /// Description regexes whose matches are forced positive (payments,
    /// refunds).
    #[serde(default)]
    pub positive_patterns: Vec<String>,
    /// Description regexes whose matches are marked ignored (balances,
    /// subtotals, carried-over headers that the extraction regex also hits).
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

/// One reusable extraction descriptor for a statement "shape"
/// (bank × account kind × file type). Immutable once saved to the library;
/// edits go through the session revision store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub entity: String,
    pub account_type: AccountKind,
    /// Short strings unique to this statement format, used by the matcher.
    pub signature_keywords: Vec<String>,
    /// Source document types this template applies to. Empty means any.
    #[serde(default)]
    pub file_types: Vec<FileKind>,
    pub transaction_regex: String,
    #[serde(default)]
    pub group_mapping: GroupMapping,
    /// chrono format string for the date capture, e.g. `%d/%m/%Y` or `%d/%m`.
    pub date_format: String,
    /// Year to assume when `date_format` has no year component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_hint: Option<i32>,
    pub decimal_separator: char,
    pub thousand_separator: char,
    #[serde(default)]
    pub rules: TemplateRules,
}

impl Template {
    pub fn locale(&self) -> NumberLocale {
        NumberLocale::new(self.decimal_separator, self.thousand_separator)
    }

    /// Whether this template can apply to a document of the given kind.
    pub fn supports(&self, kind: FileKind) -> bool {
        self.file_types.is_empty() || self.file_types.contains(&kind)
    }

    /// Library file name: `{entity}_{account}_{filetype}.json`.
    pub fn library_file_name(&self) -> String {
        let entity_key = self
            .entity
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let file_key = self
            .file_types
            .first()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "generic".to_string());
        format!("{entity_key}_{}_{file_key}.json", self.account_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template {
            entity: "Banco Andino".to_string(),
            account_type: AccountKind::Debit,
            signature_keywords: vec!["extracto".into(), "banco andino".into()],
            file_types: vec![FileKind::Pdf],
            transaction_regex: r"^(\d{2}/\d{2})\s+(.+?)\s+(-?[\d.,]+)$".to_string(),
            group_mapping: GroupMapping::default(),
            date_format: "%d/%m".to_string(),
            year_hint: Some(2025),
            decimal_separator: ',',
            thousand_separator: '.',
            rules: TemplateRules::default(),
        }
    }

    #[test]
    fn supports_declared_file_types_only() {
        let t = template();
        assert!(t.supports(FileKind::Pdf));
        assert!(!t.supports(FileKind::Csv));
    }

    #[test]
    fn empty_file_types_supports_everything() {
        let mut t = template();
        t.file_types.clear();
        assert!(t.supports(FileKind::Csv));
        assert!(t.supports(FileKind::Xlsx));
    }

    #[test]
    fn library_file_name_is_stable() {
        assert_eq!(template().library_file_name(), "banco_andino_debit_pdf.json");
    }

    #[test]
    fn json_round_trip_keeps_separators() {
        let t = template();
        let json = serde_json::to_string(&t).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decimal_separator, ',');
        assert_eq!(back.thousand_separator, '.');
        assert_eq!(back.account_type, AccountKind::Debit);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "entity": "Nu",
            "account_type": "credit",
            "signature_keywords": ["nu colombia"],
            "transaction_regex": "(.+)",
            "date_format": "%Y-%m-%d",
            "decimal_separator": ".",
            "thousand_separator": ","
        }"#;
        let t: Template = serde_json::from_str(json).unwrap();
        assert!(t.file_types.is_empty());
        assert_eq!(t.group_mapping.date, 1);
        assert!(!t.rules.default_negative);
        assert!(t.year_hint.is_none());
    }
}
