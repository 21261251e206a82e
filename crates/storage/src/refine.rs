use extracto_core::Template;
use extracto_engine::{process, Extraction};

use crate::{RevisionStore, StorageError};

/// Result of one refinement step: the new template revision and the batch it
/// produced when re-run against the session's source text.
#[derive(Debug)]
pub struct RefineOutcome {
    pub template: Template,
    pub version: u32,
    pub extraction: Extraction,
}

/// Surgical template edits during a refinement session.
///
/// Each operation reads one base revision, applies exactly one change,
/// appends the result as a new revision and immediately re-processes the
/// session's original text so the caller sees the effect of the edit. Only
/// regex edits may change how many rows match; pattern edits re-classify
/// rows that already matched.
pub struct Refiner<'a> {
    revisions: &'a RevisionStore,
    session_id: &'a str,
    source_text: &'a str,
}

impl<'a> Refiner<'a> {
    pub fn new(revisions: &'a RevisionStore, session_id: &'a str, source_text: &'a str) -> Self {
        Self {
            revisions,
            session_id,
            source_text,
        }
    }

    /// Mark rows whose description matches `pattern` as ignored.
    pub fn add_ignore_pattern(
        &self,
        base_version: u32,
        pattern: &str,
    ) -> Result<RefineOutcome, StorageError> {
        self.step(base_version, |t| {
            push_unique(&mut t.rules.ignore_patterns, pattern);
        })
    }

    /// Force rows whose description matches `pattern` to a positive value.
    pub fn add_positive_pattern(
        &self,
        base_version: u32,
        pattern: &str,
    ) -> Result<RefineOutcome, StorageError> {
        self.step(base_version, |t| {
            push_unique(&mut t.rules.positive_patterns, pattern);
        })
    }

    /// Replace the row-matching regex.
    pub fn update_regex(
        &self,
        base_version: u32,
        regex: &str,
    ) -> Result<RefineOutcome, StorageError> {
        self.step(base_version, |t| {
            t.transaction_regex = regex.to_string();
        })
    }

    fn step(
        &self,
        base_version: u32,
        edit: impl FnOnce(&mut Template),
    ) -> Result<RefineOutcome, StorageError> {
        let mut template = self.revisions.template(self.session_id, base_version)?;
        edit(&mut template);

        let version = self.revisions.append_template(self.session_id, &template)?;
        let extraction = process(&template, self.source_text)?;

        let mut statement = extracto_core::Statement::new(&template.entity, template.account_type);
        statement.transactions = extraction.transactions.clone();
        extracto_engine::recalculate(&mut statement);
        self.revisions.append_batch(self.session_id, &statement)?;

        tracing::info!(
            session = self.session_id,
            version,
            rows = extraction.transactions.len(),
            "template refined"
        );
        Ok(RefineOutcome {
            template,
            version,
            extraction,
        })
    }
}

fn push_unique(patterns: &mut Vec<String>, pattern: &str) {
    if !patterns.iter().any(|p| p == pattern) {
        patterns.push(pattern.to_string());
    }
}
