use thiserror::Error;

/// Row-level parse failures. These are recovered per row by the processor
/// (one bad line must not discard an entire statement); callers that parse a
/// single value propagate them as-is.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("malformed number: '{0}'")]
    MalformedNumber(String),
    #[error("malformed date: '{0}' (expected format '{1}')")]
    MalformedDate(String, String),
}
