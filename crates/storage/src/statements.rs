use std::path::{Path, PathBuf};

use extracto_core::Statement;

use crate::{store, StorageError};

/// Processed statement files, one JSON document per source statement.
pub struct StatementStore {
    dir: PathBuf,
}

impl StatementStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, name: &str, statement: &Statement) -> Result<(), StorageError> {
        store::write_atomic(&self.path(name), statement)?;
        tracing::info!(file = name, rows = statement.transactions.len(), "statement saved");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Statement, StorageError> {
        let path = self.path(name);
        if !path.exists() {
            return Err(StorageError::StatementNotFound(name.to_string()));
        }
        store::load(&path)
    }

    /// Stored statement file names, sorted.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Every stored statement, in file name order.
    pub fn load_all(&self) -> Result<Vec<Statement>, StorageError> {
        self.list()?
            .into_iter()
            .map(|name| self.load(&name))
            .collect()
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source = self.path(from);
        if !source.exists() {
            return Err(StorageError::StatementNotFound(from.to_string()));
        }
        std::fs::rename(source, self.path(to))?;
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path(name);
        if !path.exists() {
            return Err(StorageError::StatementNotFound(name.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    /// Rename the display description of one transaction, wherever it lives.
    /// The original description and the id are left untouched, so description
    /// based rules and id stability both survive the edit.
    pub fn update_description(
        &self,
        transaction_id: &str,
        new_description: &str,
    ) -> Result<String, StorageError> {
        for name in self.list()? {
            let mut statement = self.load(&name)?;
            let hit = statement
                .transactions
                .iter_mut()
                .find(|t| t.id == transaction_id);
            if let Some(tx) = hit {
                tx.description = new_description.to_string();
                self.save(&name, &statement)?;
                return Ok(name);
            }
        }
        Err(StorageError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Recompute a statement's summary from its current rows and persist it.
    pub fn recalculate(&self, name: &str) -> Result<Statement, StorageError> {
        let mut statement = self.load(name)?;
        extracto_engine::recalculate(&mut statement);
        self.save(name, &statement)?;
        Ok(statement)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use extracto_core::{AccountKind, Transaction};
    use rust_decimal::Decimal;

    fn statement_with(descriptions: &[(&str, i64)]) -> Statement {
        let mut st = Statement::new("Banco Andino", AccountKind::Debit);
        st.transactions = descriptions
            .iter()
            .enumerate()
            .map(|(i, (desc, value))| {
                Transaction::new(
                    NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
                    desc.to_string(),
                    Decimal::new(*value, 0),
                    i,
                )
            })
            .collect();
        extracto_engine::recalculate(&mut st);
        st
    }

    #[test]
    fn save_list_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let statements = StatementStore::new(dir.path());

        statements
            .save("2025-10.json", &statement_with(&[("UBER TRIP", -45_000)]))
            .unwrap();
        statements
            .save("2025-09.json", &statement_with(&[("PAGO", 120_000)]))
            .unwrap();

        assert_eq!(statements.list().unwrap(), vec!["2025-09.json", "2025-10.json"]);
        let loaded = statements.load("2025-10.json").unwrap();
        assert_eq!(loaded.transactions[0].description, "UBER TRIP");
    }

    #[test]
    fn update_description_keeps_original_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let statements = StatementStore::new(dir.path());
        let st = statement_with(&[("UBER TRIP HELP.UBER.COM", -45_000)]);
        let id = st.transactions[0].id.clone();
        statements.save("2025-10.json", &st).unwrap();

        let file = statements.update_description(&id, "Uber").unwrap();
        assert_eq!(file, "2025-10.json");

        let loaded = statements.load("2025-10.json").unwrap();
        assert_eq!(loaded.transactions[0].description, "Uber");
        assert_eq!(
            loaded.transactions[0].original_description,
            "UBER TRIP HELP.UBER.COM"
        );
        assert_eq!(loaded.transactions[0].id, id);
    }

    #[test]
    fn update_description_for_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let statements = StatementStore::new(dir.path());
        statements
            .save("2025-10.json", &statement_with(&[("UBER TRIP", -45_000)]))
            .unwrap();

        assert!(matches!(
            statements.update_description("nope", "X"),
            Err(StorageError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let statements = StatementStore::new(dir.path());
        statements
            .save("draft.json", &statement_with(&[("UBER TRIP", -45_000)]))
            .unwrap();

        statements.rename("draft.json", "2025-10.json").unwrap();
        assert_eq!(statements.list().unwrap(), vec!["2025-10.json"]);

        statements.delete("2025-10.json").unwrap();
        assert!(statements.list().unwrap().is_empty());

        assert!(matches!(
            statements.delete("2025-10.json"),
            Err(StorageError::StatementNotFound(_))
        ));
    }

    #[test]
    fn recalculate_refreshes_the_summary_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let statements = StatementStore::new(dir.path());
        let mut st = statement_with(&[("UBER TRIP", -45_000)]);
        st.meta_info.summary.total_debits = Decimal::ZERO;
        store::write_atomic(&dir.path().join("2025-10.json"), &st).unwrap();

        let recalculated = statements.recalculate("2025-10.json").unwrap();
        assert_eq!(
            recalculated.meta_info.summary.total_debits,
            Decimal::new(45_000, 0)
        );

        let reloaded = statements.load("2025-10.json").unwrap();
        assert_eq!(
            reloaded.meta_info.summary.total_debits,
            Decimal::new(45_000, 0)
        );
    }
}
