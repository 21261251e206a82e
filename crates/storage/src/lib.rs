pub mod library;
pub mod refine;
pub mod revisions;
pub mod rules_store;
pub mod statements;
pub mod store;

pub use library::TemplateLibrary;
pub use refine::{RefineOutcome, Refiner};
pub use revisions::{Revision, RevisionStore};
pub use rules_store::RuleStore;
pub use statements::StatementStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse {file}: {source}")]
    BadFile {
        file: String,
        source: serde_json::Error,
    },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("statement not found: {0}")]
    StatementNotFound(String),

    #[error("no revision v{version} for session {session}")]
    RevisionNotFound { session: String, version: u32 },

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("a rule needs a description (global) or a transaction id")]
    MissingRuleKey,

    #[error(transparent)]
    Process(#[from] extracto_engine::ProcessError),
}
