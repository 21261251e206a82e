use rust_decimal::Decimal;

use extracto_core::{AccountKind, Statement, Summary, Transaction};

/// Recompute one file's summary from its transactions.
///
/// Credits are the non-ignored inflows, debits the absolute non-ignored
/// outflows. A debit account's balance is simply credits − debits; a credit
/// card starts from the statement's own reported opening balance.
pub fn file_summary(
    transactions: &[Transaction],
    account_kind: AccountKind,
    prior_balance: Option<Decimal>,
) -> Summary {
    let mut total_credits = Decimal::ZERO;
    let mut total_debits = Decimal::ZERO;

    for tx in transactions.iter().filter(|t| !t.ignored) {
        if tx.value > Decimal::ZERO {
            total_credits += tx.value;
        } else {
            total_debits += tx.value.abs();
        }
    }

    let balance = match account_kind {
        AccountKind::Debit => total_credits - total_debits,
        AccountKind::Credit => {
            prior_balance.unwrap_or(Decimal::ZERO) + total_credits - total_debits
        }
    };

    Summary { balance, total_credits, total_debits, prior_balance }
}

/// Refresh a statement's stored summary in place. The stored copy is a cache
/// of this computation, never an independent source of truth.
pub fn recalculate(statement: &mut Statement) {
    statement.meta_info.summary = file_summary(
        &statement.transactions,
        statement.meta_info.account_kind,
        statement.meta_info.summary.prior_balance,
    );
}

/// Cross-file rollup for the dashboard.
///
/// Credits from credit-card files are payments *into* the card and are not
/// income: they stay in that file's own summary but contribute nothing here.
/// Debits and balances always roll up.
pub fn rollup<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> Summary {
    let mut out = Summary::default();
    for st in statements {
        let s = &st.meta_info.summary;
        out.balance += s.balance;
        out.total_debits += s.total_debits;
        if st.meta_info.account_kind == AccountKind::Debit {
            out.total_credits += s.total_credits;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(desc: &str, value: &str, ignored: bool) -> Transaction {
        let mut t = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
            desc.to_string(),
            dec(value),
            0,
        );
        t.ignored = ignored;
        t
    }

    fn statement(kind: AccountKind, txs: Vec<Transaction>, prior: Option<&str>) -> Statement {
        let mut st = Statement::new("Banco Andino", kind);
        st.meta_info.summary.prior_balance = prior.map(dec);
        st.transactions = txs;
        recalculate(&mut st);
        st
    }

    #[test]
    fn debit_balance_is_credits_minus_debits() {
        let s = file_summary(
            &[tx("NOMINA", "1200000", false), tx("MERCADO", "-300000", false)],
            AccountKind::Debit,
            None,
        );
        assert_eq!(s.total_credits, dec("1200000"));
        assert_eq!(s.total_debits, dec("300000"));
        assert_eq!(s.balance, dec("900000"));
    }

    #[test]
    fn credit_balance_carries_prior() {
        let s = file_summary(
            &[tx("PAGO", "120000", false), tx("COMPRA", "-80000", false)],
            AccountKind::Credit,
            Some(dec("-500000")),
        );
        assert_eq!(s.balance, dec("-460000"));
    }

    #[test]
    fn ignored_transactions_excluded_from_totals() {
        let s = file_summary(
            &[
                tx("SALDO ANTERIOR", "900000", true),
                tx("CAFE", "-8500", false),
            ],
            AccountKind::Debit,
            None,
        );
        assert_eq!(s.total_credits, Decimal::ZERO);
        assert_eq!(s.total_debits, dec("8500"));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut st = statement(
            AccountKind::Debit,
            vec![tx("NOMINA", "1200000", false), tx("CAFE", "-8500", false)],
            None,
        );
        let first = st.meta_info.summary.clone();
        recalculate(&mut st);
        assert_eq!(st.meta_info.summary, first);
    }

    #[test]
    fn rollup_skips_credit_card_credits() {
        // A card payment is a credit in its own file but never income.
        let card = statement(AccountKind::Credit, vec![tx("PAGO TARJETA", "120000", false)], None);
        assert_eq!(card.meta_info.summary.total_credits, dec("120000"));

        let total = rollup([&card]);
        assert_eq!(total.total_credits, Decimal::ZERO);
    }

    #[test]
    fn rollup_keeps_debit_account_credits() {
        let checking = statement(
            AccountKind::Debit,
            vec![tx("NOMINA", "1200000", false), tx("MERCADO", "-300000", false)],
            None,
        );
        let card = statement(
            AccountKind::Credit,
            vec![tx("PAGO TARJETA", "120000", false), tx("COMPRA", "-80000", false)],
            None,
        );

        let total = rollup([&checking, &card]);
        assert_eq!(total.total_credits, dec("1200000"));
        assert_eq!(total.total_debits, dec("380000"));
        assert_eq!(total.balance, dec("940000"));
    }

    #[test]
    fn rollup_of_nothing_is_zero() {
        let total = rollup(Vec::<&Statement>::new());
        assert_eq!(total, Summary::default());
    }
}
