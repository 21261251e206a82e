use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use extracto_core::{Template, Transaction};

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("suggester backend error: {0}")]
    Backend(String),
}

/// One row proposed by the suggester before ids are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftTransaction {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "valor")]
    pub value: Decimal,
    #[serde(default)]
    pub ignored: bool,
}

/// A proposed category grouping for a batch of transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSuggestion {
    #[serde(rename = "transactionIds")]
    pub transaction_ids: Vec<String>,
    #[serde(rename = "suggestedCategory")]
    pub suggested_category: String,
    pub confidence: f32,
    pub reason: String,
}

/// Abstraction over the hosted language model. Advisory only: everything it
/// returns is a draft the user confirms, and the engine must keep working if
/// this collaborator is absent or wrong.
pub trait LlmSuggester: Send + Sync {
    /// Draft a template for a statement format no library template matched.
    fn suggest_template(&self, text: &str) -> Result<Template, SuggestError>;

    /// Propose category groupings for uncategorized transactions.
    fn suggest_groups(
        &self,
        transactions: &[Transaction],
        categories: &[String],
    ) -> Result<Vec<GroupSuggestion>, SuggestError>;

    /// Extract the transactions visible on a single document page.
    fn extract_page(&self, page_text: &str, page_number: usize)
        -> Result<Vec<DraftTransaction>, SuggestError>;
}

// ── Cooperative cancellation ──────────────────────────────────────────────────

/// Shared cancel signal for the page loop. Cloning hands the same flag to the
/// caller; the loop checks it before starting each page.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Batched page-by-page extraction ───────────────────────────────────────────

/// Result of a (possibly cancelled) multi-page extraction run. Cancellation
/// keeps everything accumulated so far.
#[derive(Debug)]
pub struct PageExtraction {
    pub transactions: Vec<Transaction>,
    pub pages_total: usize,
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub cancelled: bool,
}

/// Drives the suggester over a document one page at a time.
///
/// Pages run strictly sequentially to bound token usage; a failed page is
/// logged and skipped, and a cancel request stops before the next page.
pub struct PageExtractor<S: LlmSuggester> {
    suggester: S,
}

fn page_marker() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)---\s*P[ÁA]GINA\s*\d+\s*---").expect("invalid regex"))
}

/// Split extracted text on `--- PÁGINA n ---` markers. Fragments under 100
/// characters are page-break noise, not content. No markers means the whole
/// document is one page.
pub fn split_pages(text: &str) -> Vec<&str> {
    let pages: Vec<&str> = page_marker()
        .split(text)
        .filter(|p| p.trim().len() > 100)
        .collect();
    if pages.is_empty() {
        vec![text]
    } else {
        pages
    }
}

impl<S: LlmSuggester> PageExtractor<S> {
    pub fn new(suggester: S) -> Self {
        Self { suggester }
    }

    pub fn run(&self, text: &str, cancel: &CancelFlag) -> PageExtraction {
        let pages = split_pages(text);
        let pages_total = pages.len();

        let mut transactions: Vec<Transaction> = Vec::new();
        let mut pages_processed = 0usize;
        let mut pages_failed = 0usize;

        for (idx, page) in pages.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(
                    page = idx + 1,
                    pages_total,
                    accumulated = transactions.len(),
                    "extraction cancelled"
                );
                return PageExtraction {
                    transactions,
                    pages_total,
                    pages_processed,
                    pages_failed,
                    cancelled: true,
                };
            }

            match self.suggester.extract_page(page, idx + 1) {
                Ok(drafts) => {
                    tracing::debug!(page = idx + 1, rows = drafts.len(), "page extracted");
                    for draft in drafts {
                        let ordinal = transactions.len();
                        let mut tx = Transaction::new(
                            draft.date,
                            draft.description,
                            draft.value,
                            ordinal,
                        );
                        tx.ignored = draft.ignored;
                        transactions.push(tx);
                    }
                    pages_processed += 1;
                }
                Err(e) => {
                    tracing::warn!(page = idx + 1, %e, "page extraction failed");
                    pages_failed += 1;
                }
            }
        }

        PageExtraction {
            transactions,
            pages_total,
            pages_processed,
            pages_failed,
            cancelled: false,
        }
    }
}

// ── Mock suggester (tests) ────────────────────────────────────────────────────

/// Returns canned drafts per page; can be told to fail certain pages or to
/// trip a cancel flag mid-run.
pub struct MockSuggester {
    pub pages: Vec<Vec<DraftTransaction>>,
    pub fail_pages: Vec<usize>,
    pub cancel_after: Option<(usize, CancelFlag)>,
}

impl MockSuggester {
    pub fn new(pages: Vec<Vec<DraftTransaction>>) -> Self {
        Self { pages, fail_pages: Vec::new(), cancel_after: None }
    }
}

impl LlmSuggester for MockSuggester {
    fn suggest_template(&self, _text: &str) -> Result<Template, SuggestError> {
        Err(SuggestError::Backend("mock has no template".to_string()))
    }

    fn suggest_groups(
        &self,
        _transactions: &[Transaction],
        _categories: &[String],
    ) -> Result<Vec<GroupSuggestion>, SuggestError> {
        Ok(Vec::new())
    }

    fn extract_page(
        &self,
        _page_text: &str,
        page_number: usize,
    ) -> Result<Vec<DraftTransaction>, SuggestError> {
        if let Some((after, flag)) = &self.cancel_after {
            if page_number >= *after {
                flag.cancel();
            }
        }
        if self.fail_pages.contains(&page_number) {
            return Err(SuggestError::Backend(format!("page {page_number} failed")));
        }
        Ok(self.pages.get(page_number - 1).cloned().unwrap_or_default())
    }
}
