use std::path::{Path, PathBuf};

use chrono::Utc;
use extracto_core::{CategoryRule, CategoryRules, IgnoreEntry, RuleCollection, SignEntry};

use crate::{store, StorageError};

const IGNORE_FILE: &str = "ignore-rules.json";
const SIGN_FILE: &str = "sign-rules.json";
const CATEGORY_FILE: &str = "category-rules.json";

/// File-backed rule collections. A rule targets either every transaction
/// whose description contains a key (global, `byDescription`) or one exact
/// transaction id (`byId`); writing one scope removes the same target from
/// the other so a transaction never carries two competing rules.
pub struct RuleStore {
    dir: PathBuf,
}

impl RuleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn ignore_rules(&self) -> Result<RuleCollection<IgnoreEntry>, StorageError> {
        store::read_or_default(&self.path(IGNORE_FILE))
    }

    pub fn sign_rules(&self) -> Result<RuleCollection<SignEntry>, StorageError> {
        store::read_or_default(&self.path(SIGN_FILE))
    }

    pub fn category_rules(&self) -> Result<CategoryRules, StorageError> {
        store::read_or_default(&self.path(CATEGORY_FILE))
    }

    /// Record an ignore decision. Un-ignoring deletes the entry instead of
    /// storing `false`; an absent rule already means "not ignored".
    pub fn set_ignore(
        &self,
        description: &str,
        transaction_id: &str,
        is_ignored: bool,
        apply_globally: bool,
    ) -> Result<(), StorageError> {
        let (key, scoped_global) = rule_key(description, transaction_id, apply_globally)?;

        store::update(
            &self.path(IGNORE_FILE),
            |mut rules: RuleCollection<IgnoreEntry>| {
                let entry = IgnoreEntry {
                    is_ignored,
                    last_updated: Utc::now(),
                };
                if scoped_global {
                    if is_ignored {
                        rules.by_description.insert(key.clone(), entry);
                    } else {
                        rules.by_description.remove(&key);
                    }
                    rules.by_id.remove(transaction_id);
                } else {
                    if is_ignored {
                        rules.by_id.insert(key.clone(), entry);
                    } else {
                        rules.by_id.remove(&key);
                    }
                    rules.by_description.remove(description);
                }
                rules
            },
        )?;
        tracing::debug!(global = scoped_global, ignored = is_ignored, "ignore rule set");
        Ok(())
    }

    /// Record a sign override. Unlike ignore rules, `false` is stored: it
    /// means "force negative", not "no opinion".
    pub fn set_sign(
        &self,
        description: &str,
        transaction_id: &str,
        is_positive: bool,
        is_edited: Option<bool>,
        apply_globally: bool,
    ) -> Result<(), StorageError> {
        let (key, scoped_global) = rule_key(description, transaction_id, apply_globally)?;

        store::update(
            &self.path(SIGN_FILE),
            |mut rules: RuleCollection<SignEntry>| {
                let entry = SignEntry {
                    is_positive,
                    is_edited,
                    last_updated: Utc::now(),
                };
                if scoped_global {
                    rules.by_description.insert(key.clone(), entry);
                    rules.by_id.remove(transaction_id);
                } else {
                    rules.by_id.insert(key.clone(), entry);
                    rules.by_description.remove(description);
                }
                rules
            },
        )?;
        Ok(())
    }

    /// Assign a category and display title to every transaction whose
    /// original description equals `original_description`.
    pub fn set_category(
        &self,
        original_description: &str,
        title: &str,
        category_id: &str,
        category_name: &str,
    ) -> Result<(), StorageError> {
        if original_description.is_empty() {
            return Err(StorageError::MissingRuleKey);
        }

        let key = original_description.to_string();
        store::update(&self.path(CATEGORY_FILE), |mut rules: CategoryRules| {
            rules.insert(
                key,
                CategoryRule {
                    title: title.to_string(),
                    category_id: category_id.to_string(),
                    category_name: category_name.to_string(),
                    last_updated: Utc::now(),
                },
            );
            rules
        })?;
        Ok(())
    }

    fn path(&self, file: &str) -> std::path::PathBuf {
        self.dir.join(file)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn rule_key(
    description: &str,
    transaction_id: &str,
    apply_globally: bool,
) -> Result<(String, bool), StorageError> {
    if apply_globally && !description.is_empty() {
        Ok((description.to_string(), true))
    } else if !transaction_id.is_empty() {
        Ok((transaction_id.to_string(), false))
    } else {
        Err(StorageError::MissingRuleKey)
    }
}
