use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use extracto_core::{Statement, Template};

use crate::{store, StorageError};

/// One immutable, version-numbered snapshot produced during an interactive
/// refinement session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision<T> {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

/// Append-only revision log, one directory per editing session, holding both
/// the template snapshots and the transaction batches they produced.
///
/// Versions are monotonic from 1 and a write never touches an existing file,
/// so rollback is just reading an older version.
pub struct RevisionStore {
    root: PathBuf,
}

impl RevisionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // ── Template revisions ───────────────────────────────────────────────────

    pub fn append_template(
        &self,
        session_id: &str,
        template: &Template,
    ) -> Result<u32, StorageError> {
        self.append_in(&self.template_dir(session_id), session_id, template)
    }

    pub fn template(&self, session_id: &str, version: u32) -> Result<Template, StorageError> {
        self.read_in(&self.template_dir(session_id), session_id, version)
    }

    pub fn latest_template(&self, session_id: &str) -> Result<(Template, u32), StorageError> {
        self.latest_in(&self.template_dir(session_id), session_id)
    }

    // ── Batch (processed statement) revisions ────────────────────────────────

    pub fn append_batch(
        &self,
        session_id: &str,
        statement: &Statement,
    ) -> Result<u32, StorageError> {
        self.append_in(&self.batch_dir(session_id), session_id, statement)
    }

    pub fn batch(&self, session_id: &str, version: u32) -> Result<Statement, StorageError> {
        self.read_in(&self.batch_dir(session_id), session_id, version)
    }

    pub fn latest_batch(&self, session_id: &str) -> Result<(Statement, u32), StorageError> {
        self.latest_in(&self.batch_dir(session_id), session_id)
    }

    /// Versions present for a session's templates, ascending.
    pub fn template_versions(&self, session_id: &str) -> Result<Vec<u32>, StorageError> {
        list_versions(&self.template_dir(session_id))
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn template_dir(&self, session_id: &str) -> PathBuf {
        self.root.join("templates").join(session_id)
    }

    fn batch_dir(&self, session_id: &str) -> PathBuf {
        self.root.join("batches").join(session_id)
    }

    fn append_in<T: Serialize + Clone>(
        &self,
        dir: &Path,
        session_id: &str,
        payload: &T,
    ) -> Result<u32, StorageError> {
        let version = list_versions(dir)?.last().copied().unwrap_or(0) + 1;
        let revision = Revision {
            session_id: session_id.to_string(),
            version,
            timestamp: Utc::now(),
            payload: payload.clone(),
        };
        store::write_atomic(&dir.join(format!("v{version}.json")), &revision)?;
        tracing::debug!(session = session_id, version, "revision appended");
        Ok(version)
    }

    fn read_in<T: DeserializeOwned>(
        &self,
        dir: &Path,
        session_id: &str,
        version: u32,
    ) -> Result<T, StorageError> {
        let path = dir.join(format!("v{version}.json"));
        if !path.exists() {
            return Err(StorageError::RevisionNotFound {
                session: session_id.to_string(),
                version,
            });
        }
        let revision: Revision<T> = store::load(&path)?;
        Ok(revision.payload)
    }

    fn latest_in<T: DeserializeOwned>(
        &self,
        dir: &Path,
        session_id: &str,
    ) -> Result<(T, u32), StorageError> {
        let version = list_versions(dir)?
            .last()
            .copied()
            .ok_or_else(|| StorageError::RevisionNotFound {
                session: session_id.to_string(),
                version: 0,
            })?;
        Ok((self.read_in(dir, session_id, version)?, version))
    }
}

fn list_versions(dir: &Path) -> Result<Vec<u32>, StorageError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut versions: Vec<u32> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter_map(|name| {
            name.strip_prefix('v')?
                .strip_suffix(".json")?
                .parse::<u32>()
                .ok()
        })
        .collect();
    versions.sort_unstable();
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extracto_core::{AccountKind, FileKind, GroupMapping, TemplateRules};

    fn template(regex: &str) -> Template {
        Template {
            entity: "Banco Andino".to_string(),
            account_type: AccountKind::Debit,
            signature_keywords: vec!["extracto".into()],
            file_types: vec![FileKind::Pdf],
            transaction_regex: regex.to_string(),
            group_mapping: GroupMapping::default(),
            date_format: "%d/%m/%Y".to_string(),
            year_hint: None,
            decimal_separator: ',',
            thousand_separator: '.',
            rules: TemplateRules::default(),
        }
    }

    #[test]
    fn versions_start_at_one_and_increment() {
        let dir = tempfile::tempdir().unwrap();
        let store = RevisionStore::new(dir.path());

        assert_eq!(store.append_template("s1", &template("a")).unwrap(), 1);
        assert_eq!(store.append_template("s1", &template("b")).unwrap(), 2);
        assert_eq!(store.append_template("s2", &template("c")).unwrap(), 1);
    }

    #[test]
    fn older_versions_survive_later_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = RevisionStore::new(dir.path());

        store.append_template("s1", &template("original")).unwrap();
        let v1_path = dir.path().join("templates/s1/v1.json");
        let v1_bytes = std::fs::read(&v1_path).unwrap();

        store.append_template("s1", &template("refined")).unwrap();

        assert_eq!(std::fs::read(&v1_path).unwrap(), v1_bytes);
        assert_eq!(store.template("s1", 1).unwrap().transaction_regex, "original");
        assert_eq!(store.template("s1", 2).unwrap().transaction_regex, "refined");
    }

    #[test]
    fn latest_returns_highest_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = RevisionStore::new(dir.path());
        store.append_template("s1", &template("a")).unwrap();
        store.append_template("s1", &template("b")).unwrap();

        let (t, v) = store.latest_template("s1").unwrap();
        assert_eq!(v, 2);
        assert_eq!(t.transaction_regex, "b");
    }

    #[test]
    fn missing_revision_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RevisionStore::new(dir.path());
        store.append_template("s1", &template("a")).unwrap();

        assert!(matches!(
            store.template("s1", 7),
            Err(StorageError::RevisionNotFound { version: 7, .. })
        ));
        assert!(matches!(
            store.latest_template("ghost"),
            Err(StorageError::RevisionNotFound { .. })
        ));
    }

    #[test]
    fn batches_version_independently_of_templates() {
        let dir = tempfile::tempdir().unwrap();
        let store = RevisionStore::new(dir.path());
        store.append_template("s1", &template("a")).unwrap();
        store.append_template("s1", &template("b")).unwrap();

        let st = Statement::new("Banco Andino", AccountKind::Debit);
        assert_eq!(store.append_batch("s1", &st).unwrap(), 1);

        let (loaded, v) = store.latest_batch("s1").unwrap();
        assert_eq!(v, 1);
        assert_eq!(loaded.meta_info.bank, "Banco Andino");
    }
}
