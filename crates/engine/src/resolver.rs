use extracto_core::{CategoryRules, IgnoreEntry, RuleCollection, SignEntry, Transaction};

/// Where a resolved decision came from. Description rules are "global"
/// (applied to every transaction sharing the substring, current and future);
/// id rules touch exactly one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Global,
    Single,
}

/// The effective decisions for one transaction after layering the three rule
/// collections over the extracted data.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub ignored: Option<(bool, RuleScope)>,
    pub positive: Option<(bool, RuleScope)>,
    pub display_title: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

/// Computes effective category, ignored flag, and signed value for
/// transactions without mutating any stored rule data.
pub struct RuleResolver<'a> {
    ignore_rules: &'a RuleCollection<IgnoreEntry>,
    sign_rules: &'a RuleCollection<SignEntry>,
    category_rules: &'a CategoryRules,
}

impl<'a> RuleResolver<'a> {
    pub fn new(
        ignore_rules: &'a RuleCollection<IgnoreEntry>,
        sign_rules: &'a RuleCollection<SignEntry>,
        category_rules: &'a CategoryRules,
    ) -> Self {
        Self { ignore_rules, sign_rules, category_rules }
    }

    /// Resolve one transaction. For ignore and sign, a description-keyed
    /// entry (substring of the original description) wins over an id-keyed
    /// one. Category rules are exact-match on the original description.
    pub fn resolve(&self, tx: &Transaction) -> Resolution {
        let mut res = Resolution::default();

        if let Some(e) = self.ignore_rules.find_by_description(&tx.original_description) {
            res.ignored = Some((e.is_ignored, RuleScope::Global));
        } else if let Some(e) = self.ignore_rules.find_by_id(&tx.id) {
            res.ignored = Some((e.is_ignored, RuleScope::Single));
        }

        if let Some(e) = self.sign_rules.find_by_description(&tx.original_description) {
            res.positive = Some((e.is_positive, RuleScope::Global));
        } else if let Some(e) = self.sign_rules.find_by_id(&tx.id) {
            res.positive = Some((e.is_positive, RuleScope::Single));
        }

        if let Some(rule) = self.category_rules.get(&tx.original_description) {
            if !rule.title.is_empty() {
                res.display_title = Some(rule.title.clone());
            }
            res.category_id = Some(rule.category_id.clone());
            res.category_name = Some(rule.category_name.clone());
        }

        res
    }

    /// Overlay the resolved decisions onto a batch, in place. Extraction data
    /// stays intact except for the derived fields; ids never change.
    pub fn apply(&self, transactions: &mut [Transaction]) {
        for tx in transactions.iter_mut() {
            let res = self.resolve(tx);

            if let Some((ignored, _)) = res.ignored {
                tx.ignored = ignored;
            }
            if let Some((positive, _)) = res.positive {
                tx.value = if positive { tx.value.abs() } else { -tx.value.abs() };
            }
            if let Some(title) = res.display_title {
                tx.description = title;
            }
            if res.category_id.is_some() {
                tx.category_id = res.category_id;
                tx.category_name = res.category_name;
            }
        }
    }
}
