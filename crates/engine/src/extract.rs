use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source document is encrypted. Recoverable: re-invoke with a
    /// password instead of failing the upload.
    #[error("source document requires a password")]
    PasswordRequired,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Abstraction over the tool that turns a source document (PDF, CSV, XLSX)
/// into plain text. The real converter lives outside this crate; the engine
/// only depends on this seam.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, source: &Path, password: Option<&str>) -> Result<String, ExtractError>;
}

/// Reads the source file as UTF-8 text directly. Good enough for text and
/// CSV sources, and for pre-extracted `.txt` dumps.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, source: &Path, _password: Option<&str>) -> Result<String, ExtractError> {
        Ok(std::fs::read_to_string(source)?)
    }
}

// ── Mock extractor (tests) ────────────────────────────────────────────────────

/// Returns a pre-set string, optionally demanding a password first — lets
/// tests drive the password-retry flow without a real encrypted document.
pub struct MockExtractor {
    pub text: String,
    pub required_password: Option<String>,
}

impl MockExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), required_password: None }
    }

    pub fn locked(text: impl Into<String>, password: impl Into<String>) -> Self {
        Self { text: text.into(), required_password: Some(password.into()) }
    }
}

impl TextExtractor for MockExtractor {
    fn extract(&self, _source: &Path, password: Option<&str>) -> Result<String, ExtractError> {
        match (&self.required_password, password) {
            (Some(expected), Some(given)) if expected == given => Ok(self.text.clone()),
            (Some(_), _) => Err(ExtractError::PasswordRequired),
            (None, _) => Ok(self.text.clone()),
        }
    }
}
