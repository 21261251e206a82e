pub mod aggregate;
pub mod extract;
pub mod matcher;
pub mod processor;
pub mod resolver;
pub mod suggest;

pub use aggregate::{file_summary, recalculate, rollup};
pub use extract::{ExtractError, MockExtractor, PlainTextExtractor, TextExtractor};
pub use matcher::{find_match, match_report, normalize_text, MatchScore};
pub use processor::{process, Extraction, ProcessError};
pub use resolver::{Resolution, RuleResolver, RuleScope};
pub use suggest::{
    split_pages, CancelFlag, DraftTransaction, GroupSuggestion, LlmSuggester, MockSuggester,
    PageExtraction, PageExtractor, SuggestError,
};
