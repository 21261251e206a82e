use chrono::{Datelike, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use thiserror::Error;

use extracto_core::{CoreError, Template, Transaction};

#[derive(Debug, Error)]
pub enum ProcessError {
    /// The extraction regex yielded zero rows. Surfaced, never retried: it
    /// almost always means the wrong template was applied.
    #[error("template regex matched no transactions")]
    NoMatchesFound,
    #[error("invalid transaction regex: {0}")]
    BadRegex(regex::Error),
    #[error("invalid rule pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("capture group {0} not present in regex")]
    MissingGroup(usize),
}

/// The outcome of running one template over one document's text.
///
/// `rows_matched` counts regex hits, `rows_skipped` the hits that failed
/// row-level parsing — callers report "N of M extracted" instead of silently
/// truncating.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub transactions: Vec<Transaction>,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub rows_matched: usize,
    pub rows_skipped: usize,
}

/// Apply one template's regex and rules to extracted statement text.
pub fn process(template: &Template, text: &str) -> Result<Extraction, ProcessError> {
    let regex = RegexBuilder::new(&template.transaction_regex)
        .multi_line(true)
        .build()
        .map_err(ProcessError::BadRegex)?;

    let mapping = template.group_mapping;
    let group_count = regex.captures_len();
    for idx in [mapping.date, mapping.description, mapping.value] {
        if idx >= group_count {
            return Err(ProcessError::MissingGroup(idx));
        }
    }

    let positive = compile_patterns(&template.rules.positive_patterns)?;
    let ignore = compile_patterns(&template.rules.ignore_patterns)?;
    let locale = template.locale();

    let mut transactions = Vec::new();
    let mut rows_matched = 0usize;
    let mut rows_skipped = 0usize;

    for (ordinal, caps) in regex.captures_iter(text).enumerate() {
        rows_matched += 1;

        let date_raw = caps.get(mapping.date).map(|m| m.as_str().trim());
        let desc_raw = caps.get(mapping.description).map(|m| m.as_str().trim());
        let value_raw = caps.get(mapping.value).map(|m| m.as_str().trim());
        let (Some(date_raw), Some(desc_raw), Some(value_raw)) =
            (date_raw, desc_raw, value_raw)
        else {
            rows_skipped += 1;
            continue;
        };

        let date = match parse_date(date_raw, &template.date_format, template.year_hint) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(row = ordinal, %e, "skipping row: bad date");
                rows_skipped += 1;
                continue;
            }
        };

        let value = match locale.parse(value_raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(row = ordinal, %e, "skipping row: bad value");
                rows_skipped += 1;
                continue;
            }
        };

        let mut tx = Transaction::new(date, desc_raw.to_string(), value, ordinal);

        // Precedence: an ignored row keeps its extracted sign — it is out of
        // the totals anyway, and flipping it would only confuse review.
        if ignore.iter().any(|re| re.is_match(desc_raw)) {
            tx.ignored = true;
        } else if positive.iter().any(|re| re.is_match(desc_raw)) {
            tx.value = tx.value.abs();
        } else if template.rules.default_negative {
            tx.value = -tx.value.abs();
        }

        transactions.push(tx);
    }

    if rows_matched == 0 {
        return Err(ProcessError::NoMatchesFound);
    }

    if rows_skipped > 0 {
        tracing::info!(
            extracted = transactions.len(),
            matched = rows_matched,
            skipped = rows_skipped,
            "partial extraction"
        );
    }

    let mut total_credits = Decimal::ZERO;
    let mut total_debits = Decimal::ZERO;
    for tx in transactions.iter().filter(|t| !t.ignored) {
        if tx.value > Decimal::ZERO {
            total_credits += tx.value;
        } else {
            total_debits += tx.value.abs();
        }
    }

    Ok(Extraction {
        transactions,
        total_credits,
        total_debits,
        rows_matched,
        rows_skipped,
    })
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ProcessError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| ProcessError::BadPattern { pattern: p.clone(), source })
        })
        .collect()
}

/// Parse a date capture per the template's format. Formats without a year
/// component borrow one from `year_hint` (falling back to the current year).
fn parse_date(raw: &str, format: &str, year_hint: Option<i32>) -> Result<NaiveDate, CoreError> {
    let has_year = format.contains("%Y") || format.contains("%y");
    if has_year {
        return NaiveDate::parse_from_str(raw, format)
            .map_err(|_| CoreError::MalformedDate(raw.to_string(), format.to_string()));
    }

    let year = year_hint.unwrap_or_else(|| Utc::now().year());
    let augmented_format = format!("{format}|%Y");
    let augmented_value = format!("{raw}|{year}");
    NaiveDate::parse_from_str(&augmented_value, &augmented_format)
        .map_err(|_| CoreError::MalformedDate(raw.to_string(), format.to_string()))
}
