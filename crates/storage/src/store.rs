//! Small JSON-file persistence helpers shared by every store in this crate.
//!
//! The rule and statement files are plain JSON on disk and are the only
//! shared mutable state in the system. Updates are an explicit
//! read → pure closure → atomic write; two concurrent writers still race at
//! the file level (last write wins, no merge) — that is a documented limit,
//! not an accident.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::StorageError;

/// Read a JSON file, producing the default value when the file is absent.
/// A present-but-malformed file is an error: schema drift must fail fast,
/// not decay into defaults.
pub fn read_or_default<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    load(path)
}

/// Read a JSON file that must exist.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| StorageError::BadFile {
        file: path.display().to_string(),
        source,
    })
}

/// Serialize to pretty JSON and write atomically: a temp file in the same
/// directory, then rename over the target.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::BadFile {
        file: path.display().to_string(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Read-modify-write with a pure updater.
pub fn update<T, F>(path: &Path, updater: F) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default + Serialize,
    F: FnOnce(T) -> T,
{
    let current = read_or_default(path)?;
    let updated = updater(current);
    write_atomic(path, &updated)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Map = BTreeMap<String, i64>;

    #[test]
    fn read_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let m: Map = read_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn malformed_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let result: Result<Map, _> = read_or_default(&path);
        assert!(matches!(result, Err(StorageError::BadFile { .. })));
    }

    #[test]
    fn update_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.json");

        let m: Map = update(&path, |mut m: Map| {
            m.insert("a".into(), 1);
            m
        })
        .unwrap();
        assert_eq!(m.get("a"), Some(&1));

        let m: Map = update(&path, |mut m: Map| {
            m.insert("b".into(), 2);
            m
        })
        .unwrap();
        assert_eq!(m.len(), 2);

        let reloaded: Map = load(&path).unwrap();
        assert_eq!(reloaded, m);
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.json");
        write_atomic(&path, &42i64).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
