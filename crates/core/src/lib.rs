pub mod error;
pub mod locale;
pub mod rules;
pub mod template;
pub mod transaction;

pub use error::CoreError;
pub use locale::NumberLocale;
pub use rules::{CategoryRule, CategoryRules, IgnoreEntry, RuleCollection, SignEntry};
pub use template::{AccountKind, FileKind, GroupMapping, Template, TemplateRules};
pub use transaction::{MetaInfo, Statement, Summary, Transaction};
