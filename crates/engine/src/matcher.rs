use extracto_core::{FileKind, Template};

/// Normalize statement text for signature matching: lowercase, fold
/// diacritics, collapse runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_diacritic)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Latin diacritics seen in bank statements (Spanish and Portuguese issuers).
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// How one template scored against a document. Returned by [`match_report`]
/// for diagnostics; the matcher itself only cares about the first hit.
#[derive(Debug, Clone)]
pub struct MatchScore {
    pub entity: String,
    pub matched_keywords: usize,
    pub total_keywords: usize,
    pub percentage: f32,
    pub is_match: bool,
}

/// Find the template for a statement by signature-keyword overlap.
///
/// `normalized_text` must already be passed through [`normalize_text`].
/// Returns the *first* match in library order — templates are few and
/// signatures rarely overlap, so best-of-multiple ranking buys nothing.
/// `None` means the caller should fall back to the LLM suggester.
pub fn find_match<'a>(
    templates: &'a [Template],
    normalized_text: &str,
    file_kind: FileKind,
) -> Option<&'a Template> {
    templates
        .iter()
        .find(|t| score(t, normalized_text, file_kind).is_match)
}

/// Score every template against the document. Diagnostic companion to
/// [`find_match`]; the percentages tell a template author how close an
/// almost-match came.
pub fn match_report(
    templates: &[Template],
    normalized_text: &str,
    file_kind: FileKind,
) -> Vec<MatchScore> {
    templates
        .iter()
        .map(|t| score(t, normalized_text, file_kind))
        .collect()
}

fn score(template: &Template, normalized_text: &str, file_kind: FileKind) -> MatchScore {
    let total = template.signature_keywords.len();
    let mut matched = 0;

    // A template for another file type, or one without signatures, never
    // matches regardless of keyword overlap.
    let eligible = template.supports(file_kind) && total > 0;
    if eligible {
        matched = template
            .signature_keywords
            .iter()
            .filter(|k| normalized_text.contains(&normalize_text(k)))
            .count();
    }

    let percentage = if total > 0 {
        matched as f32 / total as f32 * 100.0
    } else {
        0.0
    };

    let is_match = eligible && (percentage >= 75.0 || (total <= 3 && matched >= 2));

    MatchScore {
        entity: template.entity.clone(),
        matched_keywords: matched,
        total_keywords: total,
        percentage,
        is_match,
    }
}
