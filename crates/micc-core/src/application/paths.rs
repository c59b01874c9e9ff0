//! Project discovery and in-place file edits over the ports.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, ManifestStore};
use crate::domain::structure::{INIT_FILE, SOURCE_EXT};
use crate::domain::{Placement, canonicalize, text};
use crate::error::MiccResult;

/// Name of the packaging manifest.
pub const PYPROJECT: &str = "pyproject.toml";

/// Key of the authoritative project name.
pub const NAME_KEY: [&str; 3] = ["tool", "poetry", "name"];

/// Key of the authoritative version.
pub const VERSION_KEY: [&str; 3] = ["tool", "poetry", "version"];

/// Top-level module file of a project.
pub fn module_file(project: &Path, package_name: &str) -> PathBuf {
    project.join(format!("{package_name}.{SOURCE_EXT}"))
}

/// Top-level package init file of a project.
pub fn package_init(project: &Path, package_name: &str) -> PathBuf {
    project.join(package_name).join(INIT_FILE)
}

/// `true` if `path` holds a `pyproject.toml` naming a project whose top-level
/// module file or package exists.
pub fn is_project_directory(fs: &dyn Filesystem, manifests: &dyn ManifestStore, path: &Path) -> bool {
    let pyproject = path.join(PYPROJECT);
    if !manifests.exists(&pyproject) {
        return false;
    }
    let Ok(name) = manifests.open(&pyproject).and_then(|doc| doc.get_str(&NAME_KEY)) else {
        return false;
    };
    let package_name = canonicalize(&name);
    fs.is_file(&module_file(path, &package_name)) || fs.is_file(&package_init(path, &package_name))
}

/// The first ancestor of `path` (itself included) that is a project
/// directory. A path that does not exist is never inside a project.
pub fn find_project_root(
    fs: &dyn Filesystem,
    manifests: &dyn ManifestStore,
    path: &Path,
) -> MiccResult<PathBuf> {
    let not_in_project = || ApplicationError::NotInProject { path: path.to_path_buf() };
    let start = fs.canonicalize(path).map_err(|_| not_in_project())?;
    start
        .ancestors()
        .find(|p| is_project_directory(fs, manifests, p))
        .map(Path::to_path_buf)
        .ok_or_else(|| not_in_project().into())
}

/// Replace every occurrence of `old` in the file at `path` by `new`.
pub fn replace_in_file(fs: &dyn Filesystem, path: &Path, old: &str, new: &str) -> MiccResult<()> {
    let contents = fs.read_to_string(path)?;
    let updated = text::replace_all(&contents, old, new).ok_or_else(|| ApplicationError::PatternNotFound {
        path: path.to_path_buf(),
        pattern: old.to_owned(),
    })?;
    fs.write(path, updated.as_bytes())?;
    debug!(path = %path.display(), "replaced '{old}'");
    Ok(())
}

/// Insert `lines` before or after the first line of the file at `path` that
/// starts with `startswith`.
pub fn insert_in_file(
    fs: &dyn Filesystem,
    path: &Path,
    lines: &[&str],
    placement: Placement,
    startswith: &str,
) -> MiccResult<()> {
    let contents = fs.read_to_string(path)?;
    let updated = text::insert_lines(&contents, lines, placement, startswith).ok_or_else(|| {
        ApplicationError::PatternNotFound {
            path: path.to_path_buf(),
            pattern: startswith.to_owned(),
        }
    })?;
    fs.write(path, updated.as_bytes())?;
    debug!(path = %path.display(), "inserted {} line(s)", lines.len());
    Ok(())
}
