use std::path::{Path, PathBuf};

use extracto_core::Template;

use crate::{store, StorageError};

/// The permanent template library: one immutable JSON file per statement
/// shape. Iteration order is sorted file name order, which is what the
/// matcher's "first match wins" contract is anchored to.
pub struct TemplateLibrary {
    dir: PathBuf,
}

impl TemplateLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All templates in stored order. An unreadable file aborts the load with
    /// its name — silent skips here would make match results unexplainable.
    pub fn load_all(&self) -> Result<Vec<Template>, StorageError> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(_, t)| t)
            .collect())
    }

    /// Template file names in stored order.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries()?.into_iter().map(|(n, _)| n).collect())
    }

    pub fn get(&self, file_name: &str) -> Result<Template, StorageError> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            return Err(StorageError::TemplateNotFound(file_name.to_string()));
        }
        store::load(&path)
    }

    /// Save to the library under the template's canonical name. Returns the
    /// file name.
    pub fn save(&self, template: &Template) -> Result<String, StorageError> {
        let file_name = template.library_file_name();
        store::write_atomic(&self.dir.join(&file_name), template)?;
        tracing::info!(file = %file_name, entity = %template.entity, "template saved");
        Ok(file_name)
    }

    fn entries(&self) -> Result<Vec<(String, Template)>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let template = store::load(&self.dir.join(&name))?;
                Ok((name, template))
            })
            .collect()
    }
}
