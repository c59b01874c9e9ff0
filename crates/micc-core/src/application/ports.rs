//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `micc-adapters` crate provides the filesystem, manifest, template and
//! process implementations; the CLI provides the prompter and the log sink.

use std::path::{Path, PathBuf};

use crate::domain::{ParameterSpec, Parameters};
use crate::error::MiccResult;

/// One entry returned by [`Filesystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    /// Final path component as UTF-8, or an empty string.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `micc_adapters::filesystem::LocalFilesystem` (production)
pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// `true` for a symbolic link, dangling or not.
    fn is_symlink(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> MiccResult<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> MiccResult<String>;

    /// Write a whole file atomically, creating parent directories.
    fn write(&self, path: &Path, contents: &[u8]) -> MiccResult<()>;

    /// Append to a file, creating it if needed.
    fn append(&self, path: &Path, contents: &str) -> MiccResult<()>;

    fn copy(&self, from: &Path, to: &Path) -> MiccResult<()>;

    fn rename(&self, from: &Path, to: &Path) -> MiccResult<()>;

    fn create_dir_all(&self, path: &Path) -> MiccResult<()>;

    fn remove_file(&self, path: &Path) -> MiccResult<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> MiccResult<()>;

    fn remove_dir_all(&self, path: &Path) -> MiccResult<()>;

    /// Immediate children of `path`, sorted by path.
    fn read_dir(&self, path: &Path) -> MiccResult<Vec<DirEntry>>;

    /// Create a symbolic link at `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> MiccResult<()>;

    fn canonicalize(&self, path: &Path) -> MiccResult<PathBuf>;
}

/// A format-preserving structured document such as `pyproject.toml`.
///
/// Keys are addressed by their dotted path split into segments, e.g.
/// `["tool", "poetry", "version"]`.
pub trait ManifestDocument: Send {
    fn path(&self) -> &Path;

    /// `true` if the document was loaded from an existing file.
    fn exists(&self) -> bool;

    /// Read a string value; a missing key fails with `KeyMissing`.
    fn get_str(&self, key: &[&str]) -> MiccResult<String>;

    fn contains(&self, key: &[&str]) -> bool;

    /// Set a string value, creating intermediate tables.
    fn set_str(&mut self, key: &[&str], value: &str) -> MiccResult<()>;

    /// String entries of the table at `table`, in document order.
    fn entries(&self, table: &[&str]) -> Vec<(String, String)>;

    /// Write the document back atomically.
    fn save(&self) -> MiccResult<()>;
}

/// Port for opening manifest documents.
pub trait ManifestStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Open the document at `path`; a missing file yields an empty document.
    fn open(&self, path: &Path) -> MiccResult<Box<dyn ManifestDocument>>;
}

/// A template as declared by its manifest.
#[derive(Debug, Clone)]
pub struct TemplateManifest {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    /// Path of the hook script relative to the template root.
    pub hook: Option<PathBuf>,
    /// Directory the template was loaded from.
    pub root: PathBuf,
}

/// One file produced by rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Destination relative to the target directory.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Port for the template library and engine.
pub trait TemplateSource: Send + Sync {
    /// Locate and parse the template `reference` (a name or a path).
    fn load(&self, reference: &str) -> MiccResult<TemplateManifest>;

    /// Render every file of the template's root placeholder directory.
    fn render(&self, template: &TemplateManifest, params: &Parameters)
    -> MiccResult<Vec<RenderedFile>>;

    /// Render the hook script, if the template declares one.
    fn render_hook(&self, template: &TemplateManifest, params: &Parameters)
    -> MiccResult<Option<String>>;

    /// Directory injected into native-extension templates as
    /// `path_to_cmake_tools`.
    fn cmake_tools(&self) -> Option<PathBuf>;
}

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Port for running external programs.
///
/// The working directory is passed to the child; the current directory of
/// the micc process itself is never changed.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> MiccResult<ProcessOutput>;
}

/// Port for interactive parameter entry.
pub trait Prompter: Send + Sync {
    fn ask(&self, spec: &ParameterSpec) -> MiccResult<String>;
}

/// Releases an attached project log when dropped.
#[must_use = "the project log is detached as soon as the guard is dropped"]
pub struct LogGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LogGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("attached", &self.release.is_some())
            .finish()
    }
}

/// Port for the per-project log file.
pub trait LogSink: Send + Sync {
    /// Start recording into the log file of the project at `project`.
    ///
    /// With `clear`, the file is truncated first.
    fn attach(&self, project: &Path, clear: bool) -> MiccResult<LogGuard>;
}

/// Log sink that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn attach(&self, _project: &Path, _clear: bool) -> MiccResult<LogGuard> {
        Ok(LogGuard::noop())
    }
}
