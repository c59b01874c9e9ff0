//! Format-preserving `pyproject.toml` documents backed by `toml_edit`.
//!
//! Comments, key order and whitespace of the original file survive every
//! edit; only the values that are set change. Saving goes through a sibling
//! temporary file and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, TableLike, Value};
use tracing::{debug, instrument};

use micc_core::application::ApplicationError;
use micc_core::application::ports::{ManifestDocument, ManifestStore};
use micc_core::error::MiccResult;

use crate::filesystem::write_atomic;

/// A TOML document loaded from (or destined for) one file.
#[derive(Debug, Clone)]
pub struct TomlDocument {
    path: PathBuf,
    doc: DocumentMut,
    exists: bool,
}

impl TomlDocument {
    /// Load `path`; a missing file yields an empty document.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> MiccResult<Self> {
        if !path.is_file() {
            debug!("{} does not exist yet", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                doc: DocumentMut::new(),
                exists: false,
            });
        }
        let text = fs::read_to_string(path).map_err(|e| ApplicationError::Filesystem {
            path: path.to_path_buf(),
            reason: format!("Failed to read file: {e}"),
        })?;
        Self::parse(path, &text)
    }

    /// Parse `text` as the contents of `path`.
    pub fn parse(path: &Path, text: &str) -> MiccResult<Self> {
        let doc = text.parse::<DocumentMut>().map_err(|e| ApplicationError::Document {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
            exists: true,
        })
    }

    fn item(&self, key: &[&str]) -> Option<&Item> {
        key.iter().try_fold(self.doc.as_item(), |item, k| item.get(*k))
    }

    fn key_missing(&self, key: &[&str]) -> ApplicationError {
        ApplicationError::KeyMissing {
            key: key.join("."),
            path: self.path.clone(),
        }
    }
}

impl std::fmt::Display for TomlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.doc)
    }
}

impl ManifestDocument for TomlDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self) -> bool {
        self.exists
    }

    fn get_str(&self, key: &[&str]) -> MiccResult<String> {
        self.item(key)
            .and_then(Item::as_str)
            .map(str::to_owned)
            .ok_or_else(|| self.key_missing(key).into())
    }

    fn contains(&self, key: &[&str]) -> bool {
        self.item(key).is_some()
    }

    fn set_str(&mut self, key: &[&str], value: &str) -> MiccResult<()> {
        let Some((last, parents)) = key.split_last() else {
            return Err(self.key_missing(key).into());
        };

        let mut table: &mut dyn TableLike = self.doc.as_table_mut();
        for k in parents {
            table = match child_table(table, k) {
                Some(child) => child,
                None => {
                    return Err(ApplicationError::Document {
                        path: self.path.clone(),
                        reason: format!("'{k}' in '{}' is not a table", key.join(".")),
                    }
                    .into());
                }
            };
        }

        match table.get_mut(last) {
            Some(Item::Value(existing)) => {
                let decor = existing.decor().clone();
                let mut new = Value::from(value);
                *new.decor_mut() = decor;
                *existing = new;
            }
            _ => {
                table.insert(last, toml_edit::value(value));
            }
        }
        Ok(())
    }

    fn entries(&self, table: &[&str]) -> Vec<(String, String)> {
        let Some(table) = self.item(table).and_then(Item::as_table_like) else {
            return Vec::new();
        };
        table
            .iter()
            .filter_map(|(name, item)| {
                // `pkg = { version = "^1.0", optional = true }` counts by its version
                let value = item.as_str().or_else(|| {
                    item.as_table_like()
                        .and_then(|t| t.get("version"))
                        .and_then(Item::as_str)
                })?;
                Some((name.to_owned(), value.to_owned()))
            })
            .collect()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn save(&self) -> MiccResult<()> {
        write_atomic(&self.path, self.doc.to_string().as_bytes())?;
        debug!("saved {}", self.path.display());
        Ok(())
    }
}

/// The table under `key`, created (implicitly) when absent.
fn child_table<'a>(table: &'a mut dyn TableLike, key: &str) -> Option<&'a mut dyn TableLike> {
    if table.get(key).is_none() {
        let mut child = Table::new();
        child.set_implicit(true);
        table.insert(key, Item::Table(child));
    }
    table.get_mut(key)?.as_table_like_mut()
}

/// Opens [`TomlDocument`]s from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestStore;

impl TomlManifestStore {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestStore for TomlManifestStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open(&self, path: &Path) -> MiccResult<Box<dyn ManifestDocument>> {
        Ok(Box::new(TomlDocument::load(path)?))
    }
}

// ── tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use micc_core::error::MiccError;
    use tempfile::TempDir;

    const PYPROJECT: &str = r#"# project metadata
[tool.poetry]
name = "foo-bar"
version = "0.3.1"   # bumped by micc
description = "Foo"

[tool.poetry.dependencies]
python = "^3.7"
numpy = { version = "^1.18", optional = true }

[build-system]
requires = ["poetry>=0.12"]
"#;

    fn doc() -> TomlDocument {
        TomlDocument::parse(Path::new("pyproject.toml"), PYPROJECT).unwrap()
    }

    #[test]
    fn reads_nested_strings() {
        let doc = doc();
        assert_eq!(doc.get_str(&["tool", "poetry", "name"]).unwrap(), "foo-bar");
        assert!(doc.contains(&["build-system", "requires"]));
    }

    #[test]
    fn missing_key_is_key_missing() {
        let err = doc().get_str(&["tool", "poetry", "homepage"]).unwrap_err();
        assert!(matches!(
            err,
            MiccError::Application(ApplicationError::KeyMissing { ref key, .. }) if key == "tool.poetry.homepage"
        ));
    }

    #[test]
    fn set_keeps_comments_and_layout() {
        let mut doc = doc();
        doc.set_str(&["tool", "poetry", "version"], "0.3.2").unwrap();
        let text = doc.to_string();
        assert!(text.starts_with("# project metadata\n"));
        assert!(text.contains("version = \"0.3.2\"   # bumped by micc"));
        assert_eq!(text.replace("0.3.2", "0.3.1"), PYPROJECT);
    }

    #[test]
    fn set_creates_missing_tables() {
        let mut doc = doc();
        doc.set_str(&["tool", "poetry", "scripts", "greet"], "foo_bar:cli_greet.main")
            .unwrap();
        assert_eq!(
            doc.get_str(&["tool", "poetry", "scripts", "greet"]).unwrap(),
            "foo_bar:cli_greet.main"
        );
        assert!(doc.to_string().contains("[tool.poetry.scripts]\ngreet = "));
    }

    #[test]
    fn set_through_a_value_fails() {
        let mut doc = doc();
        let err = doc.set_str(&["tool", "poetry", "name", "x"], "y").unwrap_err();
        assert!(matches!(err, MiccError::Application(ApplicationError::Document { .. })));
    }

    #[test]
    fn entries_include_inline_table_versions() {
        let entries = doc().entries(&["tool", "poetry", "dependencies"]);
        assert_eq!(
            entries,
            [
                ("python".to_owned(), "^3.7".to_owned()),
                ("numpy".to_owned(), "^1.18".to_owned())
            ]
        );
        assert!(doc().entries(&["tool", "nothing"]).is_empty());
    }

    #[test]
    fn save_round_trips_through_the_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, PYPROJECT).unwrap();

        let store = TomlManifestStore::new();
        let mut doc = store.open(&path).unwrap();
        assert!(doc.exists());
        doc.set_str(&["tool", "poetry", "version"], "1.0.0").unwrap();
        doc.save().unwrap();

        let again = store.open(&path).unwrap();
        assert_eq!(again.get_str(&["tool", "poetry", "version"]).unwrap(), "1.0.0");
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = TomlManifestStore::new();
        let path = dir.path().join("pyproject.toml");
        assert!(!store.exists(&path));
        let doc = store.open(&path).unwrap();
        assert!(!doc.exists());
        assert!(!doc.contains(&["tool"]));
    }

    #[test]
    fn corrupt_file_is_a_document_error() {
        let err = TomlDocument::parse(Path::new("pyproject.toml"), "[tool\nname =").unwrap_err();
        assert!(matches!(err, MiccError::Application(ApplicationError::Document { .. })));
    }
}
