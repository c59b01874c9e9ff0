//! The project model: the authoritative view of an on-disk project.
//!
//! A [`Project`] is opened on an existing project directory and keeps the
//! packaging manifest and the top-level source file in agreement. A
//! [`NewProject`] is the seed used by `create` before anything exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use semver::Version;
use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::paths::{self, NAME_KEY, PYPROJECT, VERSION_KEY};
use crate::application::ports::{Filesystem, LogGuard, LogSink, ManifestDocument, ManifestStore};
use crate::domain::structure::{self, INIT_FILE, SOURCE_EXT};
use crate::domain::{Artifact, ArtifactKind, DomainError, Parameters, Structure, canonicalize, text, version_range};
use crate::error::MiccResult;

/// Per-project template parameter overrides.
pub const MICC_JSON: &str = "micc.json";

const DESCRIPTION_KEY: [&str; 3] = ["tool", "poetry", "description"];
const DEPENDENCIES: [&str; 3] = ["tool", "poetry", "dependencies"];

/// Seed for a project that `create` is about to materialize.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub path: PathBuf,
    pub name: String,
    pub package_name: String,
}

impl NewProject {
    /// Check that `path` can receive a new project.
    ///
    /// The directory must be absent or empty and, unless `allow_nesting`,
    /// must not lie inside another project. The name is the last path
    /// component.
    pub fn prepare(
        fs: &dyn Filesystem,
        manifests: &dyn ManifestStore,
        path: &Path,
        allow_nesting: bool,
    ) -> MiccResult<Self> {
        if fs.exists(path) && (!fs.is_dir(path) || !fs.read_dir(path)?.is_empty()) {
            return Err(ApplicationError::NotEmpty { path: path.to_path_buf() }.into());
        }

        let absolute = absolute_path(fs, path);
        if !allow_nesting
            && let Some(parent) = absolute
                .ancestors()
                .skip(1)
                .find(|p| paths::is_project_directory(fs, manifests, p))
        {
            return Err(ApplicationError::NestedProjectRefused {
                path: path.to_path_buf(),
                parent: parent.to_path_buf(),
            }
            .into());
        }

        let name = absolute
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        if !crate::domain::verify_project_name(&name) {
            return Err(DomainError::InvalidProjectName { name }.into());
        }

        Ok(Self {
            package_name: canonicalize(&name),
            name,
            path: absolute,
        })
    }
}

/// Absolute form of `path`, resolving through the nearest existing ancestor.
fn absolute_path(fs: &dyn Filesystem, path: &Path) -> PathBuf {
    if let Ok(p) = fs.canonicalize(path) {
        return p;
    }
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(base) = fs.canonicalize(current) {
            return missing.iter().rev().fold(base, |acc: PathBuf, c| acc.join(c));
        }
        match (current.file_name(), current.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_owned());
                current = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// An existing project.
pub struct Project {
    path: PathBuf,
    name: String,
    package_name: String,
    structure: Structure,
    version: String,
    both_forms: bool,
    overrides: Parameters,
    pyproject: Box<dyn ManifestDocument>,
    fs: Arc<dyn Filesystem>,
    manifests: Arc<dyn ManifestStore>,
    _log: Option<LogGuard>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("structure", &self.structure)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Open the project at `path`, which must be a project directory.
    #[instrument(skip(fs, manifests), fields(path = %path.display()))]
    pub fn open(fs: Arc<dyn Filesystem>, manifests: Arc<dyn ManifestStore>, path: &Path) -> MiccResult<Self> {
        if !paths::is_project_directory(fs.as_ref(), manifests.as_ref(), path) {
            return Err(ApplicationError::NotInProject { path: path.to_path_buf() }.into());
        }
        let path = fs.canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let pyproject = manifests.open(&path.join(PYPROJECT))?;
        let name = pyproject.get_str(&NAME_KEY)?;
        let version = pyproject.get_str(&VERSION_KEY)?;
        let package_name = canonicalize(&name);

        let has_module = fs.is_file(&paths::module_file(&path, &package_name));
        let has_package = fs.is_file(&paths::package_init(&path, &package_name));
        let both_forms = has_module && has_package;
        if both_forms {
            warn!("Project {name} has both a module file and a package directory; treating it as a package");
        }
        let structure = if has_package {
            Structure::Package
        } else {
            Structure::Module
        };

        let micc_json = path.join(MICC_JSON);
        let overrides = if fs.is_file(&micc_json) {
            Parameters::from_json(&fs.read_to_string(&micc_json)?)?
        } else {
            Parameters::new()
        };

        debug!(%structure, %version, "opened project {name}");
        Ok(Self {
            path,
            name,
            package_name,
            structure,
            version,
            both_forms,
            overrides,
            pyproject,
            fs,
            manifests,
            _log: None,
        })
    }

    /// Start recording into the project log; released when the project is
    /// dropped.
    pub fn attach_log(&mut self, sink: &dyn LogSink, clear: bool) -> MiccResult<()> {
        self._log = Some(sink.attach(&self.path, clear)?);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `true` when both a module file and a package directory exist.
    pub fn has_both_forms(&self) -> bool {
        self.both_forms
    }

    /// Parameters recorded in `P/micc.json`.
    pub fn overrides(&self) -> &Parameters {
        &self.overrides
    }

    /// `tool.poetry.description`, or an empty string.
    pub fn description(&self) -> String {
        self.pyproject.get_str(&DESCRIPTION_KEY).unwrap_or_default()
    }

    /// The package directory `P/<package_name>`.
    pub fn package_dir(&self) -> PathBuf {
        self.path.join(&self.package_name)
    }

    /// The top-level source file.
    pub fn source_file(&self) -> PathBuf {
        match self.structure {
            Structure::Module => paths::module_file(&self.path, &self.package_name),
            _ => paths::package_init(&self.path, &self.package_name),
        }
    }

    /// The file carrying `__version__`: `P/<pkg>/__version__.py` when
    /// present, else the top-level source file.
    pub fn version_file(&self) -> PathBuf {
        if self.structure != Structure::Module {
            let dedicated = self.package_dir().join(format!("__version__.{SOURCE_EXT}"));
            if self.fs.is_file(&dedicated) {
                return dedicated;
            }
        }
        self.source_file()
    }

    /// Write `version` to the packaging manifest and to the `__version__`
    /// assignment.
    #[instrument(skip(self), fields(project = %self.name))]
    pub fn set_version(&mut self, version: &Version) -> MiccResult<()> {
        let pyproject_path = self.path.join(PYPROJECT);
        if !self.fs.is_file(&pyproject_path) {
            return Err(ApplicationError::VersionLocationMissing { path: pyproject_path }.into());
        }
        let source = self.version_file();
        if !self.fs.is_file(&source) {
            return Err(ApplicationError::VersionLocationMissing { path: source }.into());
        }

        let new = version.to_string();
        let updated = self.updated_version_source(&source, &new)?;
        self.pyproject.set_str(&VERSION_KEY, &new)?;
        self.pyproject.save()?;
        self.fs.write(&source, updated.as_bytes())?;

        info!("({}) version {} -> {new}", self.name, self.version);
        self.version = new;
        Ok(())
    }

    /// Re-read the packaging manifest (after an external tool changed it)
    /// and copy its version into `__version__`.
    pub fn sync_source_version(&mut self) -> MiccResult<()> {
        self.pyproject = self.manifests.open(&self.path.join(PYPROJECT))?;
        let version = self.pyproject.get_str(&VERSION_KEY)?;
        let source = self.version_file();
        if !self.fs.is_file(&source) {
            return Err(ApplicationError::VersionLocationMissing { path: source }.into());
        }
        let updated = self.updated_version_source(&source, &version)?;
        self.fs.write(&source, updated.as_bytes())?;
        self.version = version;
        Ok(())
    }

    fn updated_version_source(&self, source: &Path, version: &str) -> MiccResult<String> {
        let contents = self.fs.read_to_string(source)?;
        text::set_version_assignment(&contents, version).ok_or_else(|| {
            ApplicationError::PatternNotFound {
                path: source.to_path_buf(),
                pattern: "__version__ =".into(),
            }
            .into()
        })
    }

    /// Applications and modules in the package directory.
    pub fn list_artifacts(&self) -> MiccResult<Vec<Artifact>> {
        if self.structure == Structure::Module {
            return Ok(Vec::new());
        }
        let package_dir = self.package_dir();
        let entries = self.fs.read_dir(&package_dir)?;
        Ok(entries
            .iter()
            .filter_map(|entry| {
                structure::classify(entry.name(), entry.is_dir, |rel| {
                    self.fs.is_file(&package_dir.join(rel))
                })
            })
            .collect())
    }

    /// `true` if an artifact `name` of `kind` exists.
    pub fn has_artifact(&self, kind: ArtifactKind, name: &str) -> bool {
        self.fs.is_file(&self.package_dir().join(kind.source_path(name)))
    }

    pub fn app_exists(&self, name: &str) -> bool {
        self.has_artifact(ArtifactKind::Application, name)
    }

    /// `true` if a module `name` exists in any form.
    pub fn module_exists(&self, name: &str) -> bool {
        ArtifactKind::MODULES
            .iter()
            .any(|kind| self.has_artifact(*kind, name))
    }

    /// Kind of the artifact already called `name`, whatever its kind.
    pub fn artifact_kind(&self, name: &str) -> Option<ArtifactKind> {
        if self.app_exists(name) {
            return Some(ArtifactKind::Application);
        }
        if !self.module_exists(name) {
            return None;
        }
        ArtifactKind::MODULES
            .into_iter()
            .find(|kind| self.has_artifact(*kind, name))
    }

    /// Move `P/<pkg>.py` to `P/<pkg>/__init__.py`.
    ///
    /// Returns `false` when the project already is a package.
    #[instrument(skip(self), fields(project = %self.name))]
    pub fn promote_to_package(&mut self) -> MiccResult<bool> {
        if self.structure != Structure::Module {
            return Ok(false);
        }
        let module = paths::module_file(&self.path, &self.package_name);
        promote_file(self.fs.as_ref(), &module)?;
        self.structure = Structure::Package;
        info!("Converted {} to a package", module.display());
        Ok(true)
    }

    /// Move sub-module `P/<pkg>/<name>.py` to `P/<pkg>/<name>/__init__.py`.
    pub fn promote_module(&self, name: &str) -> MiccResult<()> {
        let module = self
            .package_dir()
            .join(ArtifactKind::PyModule.source_path(name));
        promote_file(self.fs.as_ref(), &module)
    }

    /// Add or raise dependency constraints in the packaging manifest.
    ///
    /// An existing constraint is only replaced when its lower bound is older
    /// than the new one.
    pub fn add_dependencies(&mut self, deps: &[(&str, &str)]) -> MiccResult<()> {
        let current = self.pyproject.entries(&DEPENDENCIES);
        for (package, constraint) in deps {
            let existing = current
                .iter()
                .find(|(name, _)| name == package)
                .map(|(_, c)| c.as_str());
            let replace = match existing {
                None => true,
                Some(old) => is_older_constraint(old, constraint),
            };
            if replace {
                let mut key = DEPENDENCIES.to_vec();
                key.push(package);
                self.pyproject.set_str(&key, constraint)?;
                debug!("dependency {package} = \"{constraint}\"");
            }
        }
        self.pyproject.save()
    }

    /// Register console script `app` as `<target>` under
    /// `tool.poetry.scripts`.
    pub fn set_script(&mut self, app: &str, target: &str) -> MiccResult<()> {
        self.pyproject.set_str(&["tool", "poetry", "scripts", app], target)?;
        self.pyproject.save()
    }
}

/// `true` when the lower bound of `old` is older than that of `new`.
fn is_older_constraint(old: &str, new: &str) -> bool {
    match (version_range(old), version_range(new)) {
        (Ok(old), Ok(new)) => match (old.lower_version(), new.lower_version()) {
            (Some(o), Some(n)) => o < n,
            (None, Some(_)) => true,
            _ => false,
        },
        (Err(_), _) => {
            warn!("Cannot interpret dependency constraint '{old}'; leaving it");
            false
        }
        (_, Err(_)) => false,
    }
}

fn promote_file(fs: &dyn Filesystem, module: &Path) -> MiccResult<()> {
    let Some(stem) = module.file_stem() else {
        return Err(ApplicationError::Filesystem {
            path: module.to_path_buf(),
            reason: "not a module file".into(),
        }
        .into());
    };
    if !fs.is_file(module) {
        return Err(ApplicationError::Filesystem {
            path: module.to_path_buf(),
            reason: "file not found".into(),
        }
        .into());
    }
    let package = module.with_file_name(stem);
    fs.create_dir_all(&package)?;
    fs.rename(module, &package.join(INIT_FILE))?;
    debug!("{} -> {}", module.display(), package.join(INIT_FILE).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_constraint_is_replaced() {
        assert!(is_older_constraint("^6.7", "^7.0"));
        assert!(is_older_constraint("*", "^7.0"));
        assert!(!is_older_constraint("^7.1", "^7.0"));
        assert!(!is_older_constraint("^7.0", "^7.0"));
    }

    #[test]
    fn unreadable_constraint_is_kept() {
        assert!(!is_older_constraint("~=1.0 || >3", "^7.0"));
    }
}
