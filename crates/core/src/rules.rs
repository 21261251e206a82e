use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's ignore decision for a description or a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreEntry {
    #[serde(rename = "isIgnored")]
    pub is_ignored: bool,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// A user's sign decision: force the value positive (or back to negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignEntry {
    #[serde(rename = "isPositive")]
    pub is_positive: bool,
    /// Set when the flip came from a manual edit rather than a pattern.
    #[serde(rename = "isEdited", skip_serializing_if = "Option::is_none")]
    pub is_edited: Option<bool>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// One rule collection: description-keyed (global) entries plus id-keyed
/// (single-transaction) entries.
///
/// Reads consult both maps; description entries win (substring match against
/// the transaction's original description). Writes keep the maps disjoint for
/// a given transaction — storing one scope deletes the other — so a stale id
/// entry never lingers under a newer global rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCollection<E> {
    #[serde(rename = "byDescription", default = "BTreeMap::new")]
    pub by_description: BTreeMap<String, E>,
    #[serde(rename = "byId", default = "BTreeMap::new")]
    pub by_id: BTreeMap<String, E>,
}

impl<E> Default for RuleCollection<E> {
    fn default() -> Self {
        Self { by_description: BTreeMap::new(), by_id: BTreeMap::new() }
    }
}

impl<E> RuleCollection<E> {
    pub fn is_empty(&self) -> bool {
        self.by_description.is_empty() && self.by_id.is_empty()
    }

    /// First description-keyed entry whose key is a substring of the given
    /// original description. Substring (not exact) on purpose: one rule made
    /// from "UBER *TRIP" generalizes to every Uber charge.
    pub fn find_by_description(&self, original_description: &str) -> Option<&E> {
        self.by_description
            .iter()
            .find(|(key, _)| original_description.contains(key.as_str()))
            .map(|(_, entry)| entry)
    }

    pub fn find_by_id(&self, transaction_id: &str) -> Option<&E> {
        self.by_id.get(transaction_id)
    }
}

/// Category assignment, keyed externally by the transaction's *original*
/// description (exact match). Carries an optional clean display title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Clean display name shown instead of the raw statement description.
    pub title: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

pub type CategoryRules = BTreeMap<String, CategoryRule>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ignored: bool) -> IgnoreEntry {
        IgnoreEntry { is_ignored: ignored, last_updated: Utc::now() }
    }

    #[test]
    fn find_by_description_matches_substring() {
        let mut rules: RuleCollection<IgnoreEntry> = RuleCollection::default();
        rules.by_description.insert("NETFLIX".into(), entry(true));

        let hit = rules.find_by_description("NETFLIX.COM MENSUAL");
        assert!(hit.is_some());
        assert!(hit.unwrap().is_ignored);
    }

    #[test]
    fn find_by_description_no_partial_reverse_match() {
        let mut rules: RuleCollection<IgnoreEntry> = RuleCollection::default();
        // Key longer than the description: not a substring, no match.
        rules.by_description.insert("NETFLIX.COM MENSUAL".into(), entry(true));
        assert!(rules.find_by_description("NETFLIX").is_none());
    }

    #[test]
    fn wire_format_uses_camel_case_maps() {
        let mut rules: RuleCollection<IgnoreEntry> = RuleCollection::default();
        rules.by_id.insert("tx1".into(), entry(true));
        let json = serde_json::to_value(&rules).unwrap();
        assert!(json["byId"]["tx1"]["isIgnored"].as_bool().unwrap());
        assert!(json["byDescription"].as_object().unwrap().is_empty());
    }

    #[test]
    fn missing_maps_default_empty() {
        let rules: RuleCollection<SignEntry> = serde_json::from_str("{}").unwrap();
        assert!(rules.is_empty());
    }
}
