use std::collections::BTreeSet;
use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::EnrichError;

const CONDENSED_SDRF_SUFFIX: &str = "condensed-sdrf.tsv";

/// Directory of per-experiment folders, each holding `<id>/<id>.condensed-sdrf.tsv`.
#[derive(Debug, Clone)]
pub struct SdrfStore {
    root: Utf8PathBuf,
}

impl SdrfStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the current working directory.
    pub fn current_dir() -> Result<Self, EnrichError> {
        let cwd =
            std::env::current_dir().map_err(|err| EnrichError::Filesystem(err.to_string()))?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| EnrichError::Filesystem("non-utf8 working directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn experiment_dir(&self, accession: &str) -> Utf8PathBuf {
        self.root.join(accession)
    }

    pub fn condensed_sdrf_path(&self, accession: &str) -> Utf8PathBuf {
        self.experiment_dir(accession)
            .join(format!("{accession}.{CONDENSED_SDRF_SUFFIX}"))
    }

    /// Names of the immediate subdirectories of the root.
    pub fn experiment_ids(&self) -> Result<BTreeSet<String>, EnrichError> {
        let entries = fs::read_dir(self.root.as_std_path()).map_err(|err| {
            EnrichError::Filesystem(format!("list {}: {err}", self.root))
        })?;
        let mut ids = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|err| EnrichError::Filesystem(err.to_string()))?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => {
                    ids.insert(name);
                }
                Err(name) => {
                    tracing::debug!(?name, "skipping non-utf8 experiment directory");
                }
            }
        }
        Ok(ids)
    }
}

/// Writes `content` next to `path` and renames it into place.
pub fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), EnrichError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix("ebeye-enrich")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| EnrichError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| EnrichError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| EnrichError::Filesystem(format!("write {path}: {}", err.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let store = SdrfStore::new("/data/atlas/experiments");
        let path = store.condensed_sdrf_path("E-MTAB-513");
        assert!(path.ends_with("E-MTAB-513/E-MTAB-513.condensed-sdrf.tsv"));
        assert!(path.starts_with(store.root()));
    }
}
