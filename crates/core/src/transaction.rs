use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::template::AccountKind;

/// One normalized ledger entry. Wire field names are the Spanish ones used by
/// the processed-statement format; Rust code uses the English names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "descripcion")]
    pub description: String,
    /// The description as extracted, before any rename. Rule keys always
    /// point at this, never at the display description.
    #[serde(rename = "originalDescription")]
    pub original_description: String,
    #[serde(rename = "valor")]
    pub value: Decimal,
    #[serde(default)]
    pub ignored: bool,
    #[serde(rename = "categoryId", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(rename = "categoryName", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl Transaction {
    /// Build a transaction with a freshly derived id.
    pub fn new(date: NaiveDate, description: String, value: Decimal, ordinal: usize) -> Self {
        let id = Self::derive_id(date, &description, value, ordinal);
        Self {
            id,
            date,
            description: description.clone(),
            original_description: description,
            value,
            ignored: false,
            category_id: None,
            category_name: None,
        }
    }

    /// Composite id from the extracted fields plus the row's ordinal index.
    ///
    /// Derived exactly once, at extraction. Recomputing it from mutated
    /// fields would silently orphan every id-keyed rule pointing at it, so
    /// edits carry the id forward untouched.
    pub fn derive_id(date: NaiveDate, description: &str, value: Decimal, ordinal: usize) -> String {
        let desc_key: String = description
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(24)
            .collect();
        format!("{}-{}-{}-{}", date.format("%Y%m%d"), desc_key, value, ordinal)
    }
}

/// Per-file summary totals. Always derived from the transactions; stored
/// copies are recomputed whenever any transaction mutates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "saldo_actual")]
    pub balance: Decimal,
    #[serde(rename = "total_abonos")]
    pub total_credits: Decimal,
    #[serde(rename = "total_cargos")]
    pub total_debits: Decimal,
    /// Opening balance carried from the statement itself (credit cards).
    /// External data, never derived.
    #[serde(rename = "saldo_anterior", skip_serializing_if = "Option::is_none")]
    pub prior_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaInfo {
    #[serde(rename = "banco")]
    pub bank: String,
    #[serde(rename = "tipo_cuenta")]
    pub account_kind: AccountKind,
    #[serde(rename = "resumen")]
    pub summary: Summary,
}

/// A processed-statement file: the unit of persistence that owns its
/// transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub meta_info: MetaInfo,
    #[serde(rename = "transacciones")]
    pub transactions: Vec<Transaction>,
}

impl Statement {
    pub fn new(bank: impl Into<String>, account_kind: AccountKind) -> Self {
        Self {
            meta_info: MetaInfo {
                bank: bank.into(),
                account_kind,
                summary: Summary::default(),
            },
            transactions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn derive_id_is_deterministic() {
        let v = Decimal::from_str("-45000").unwrap();
        let a = Transaction::derive_id(date(2025, 10, 5), "UBER TRIP", v, 3);
        let b = Transaction::derive_id(date(2025, 10, 5), "UBER TRIP", v, 3);
        assert_eq!(a, b);
        assert_eq!(a, "20251005-ubertrip--45000-3");
    }

    #[test]
    fn derive_id_distinguishes_identical_rows_by_ordinal() {
        let v = Decimal::from_str("-12000").unwrap();
        let a = Transaction::derive_id(date(2025, 10, 5), "NETFLIX.COM", v, 0);
        let b = Transaction::derive_id(date(2025, 10, 5), "NETFLIX.COM", v, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn new_keeps_original_description() {
        let v = Decimal::from_str("100").unwrap();
        let tx = Transaction::new(date(2025, 1, 2), "PAGO NOMINA EMPRESA".into(), v, 0);
        assert_eq!(tx.description, tx.original_description);
        assert!(!tx.ignored);
    }

    #[test]
    fn statement_serializes_spanish_wire_names() {
        let mut st = Statement::new("Banco Andino", AccountKind::Debit);
        st.transactions.push(Transaction::new(
            date(2025, 3, 1),
            "CAFE".into(),
            Decimal::from_str("-8500").unwrap(),
            0,
        ));
        let json = serde_json::to_value(&st).unwrap();
        assert_eq!(json["meta_info"]["banco"], "Banco Andino");
        assert_eq!(json["meta_info"]["tipo_cuenta"], "debit");
        assert_eq!(json["transacciones"][0]["descripcion"], "CAFE");
        assert_eq!(json["transacciones"][0]["fecha"], "2025-03-01");
    }

    #[test]
    fn statement_round_trips() {
        let mut st = Statement::new("Nu", AccountKind::Credit);
        st.meta_info.summary.prior_balance = Some(Decimal::from_str("250000").unwrap());
        st.transactions.push(Transaction::new(
            date(2025, 4, 10),
            "PAGO RECIBIDO".into(),
            Decimal::from_str("120000").unwrap(),
            0,
        ));
        let json = serde_json::to_string(&st).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transactions[0].id, st.transactions[0].id);
        assert_eq!(
            back.meta_info.summary.prior_balance,
            st.meta_info.summary.prior_balance
        );
    }
}
