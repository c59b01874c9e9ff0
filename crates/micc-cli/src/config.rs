//! User preferences.
//!
//! Preferences are template parameter defaults that apply to every project
//! of the user (`full_name`, `email`, `github_username`, ...). They are
//! loaded once at startup and passed down by value; the core crate receives
//! them as the lowest override layer of [`GlobalOptions`].
//!
//! # Resolution order (highest priority first)
//!
//! 1. Command options
//! 2. `create --micc-file FILE`
//! 3. `P/micc.json` of an existing project
//! 4. `<config dir>/micc.json` (this module)
//! 5. Template manifest defaults
//!
//! [`GlobalOptions`]: micc_core::application::GlobalOptions

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::debug;

use micc_core::domain::Parameters;

/// Environment variable naming an alternative preferences file.
pub const PREFERENCES_ENV: &str = "MICC_PREFERENCES";

/// User preferences.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub parameters: Parameters,
    /// File the preferences came from, if any.
    pub source: Option<PathBuf>,
}

impl Preferences {
    /// Load the preferences file, or empty preferences when there is none.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(PREFERENCES_ENV)
            .map(PathBuf::from)
            .or_else(Self::config_path);
        match path {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load preferences from `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let parameters = Parameters::from_json(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!("Loaded {} preferences from {}", parameters.len(), path.display());
        Ok(Self {
            parameters,
            source: Some(path.to_path_buf()),
        })
    }

    /// Path of the default preferences file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "et-micc", "micc").map(|d| d.config_dir().join("micc.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let prefs = Preferences::default();
        assert!(prefs.parameters.is_empty());
        assert!(prefs.source.is_none());
    }

    #[test]
    fn accepts_both_value_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("micc.json");
        std::fs::write(
            &path,
            r#"{"full_name": {"default": "Ada Lovelace"}, "email": "ada@example.com"}"#,
        )
        .unwrap();

        let prefs = Preferences::load_from(&path).unwrap();
        assert_eq!(prefs.parameters.get("full_name"), Some("Ada Lovelace"));
        assert_eq!(prefs.parameters.get("email"), Some("ada@example.com"));
        assert_eq!(prefs.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("micc.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Preferences::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("micc.json"));
    }

    #[test]
    fn config_path_ends_in_micc_json() {
        if let Some(p) = Preferences::config_path() {
            assert!(p.ends_with("micc.json"));
        }
    }
}
