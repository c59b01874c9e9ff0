//! Local filesystem adapter using std::fs.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use micc_core::application::ApplicationError;
use micc_core::application::ports::{DirEntry, Filesystem};
use micc_core::error::{MiccError, MiccResult};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn read(&self, path: &Path) -> MiccResult<Vec<u8>> {
        fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn read_to_string(&self, path: &Path) -> MiccResult<String> {
        fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> MiccResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        write_atomic(path, contents)
    }

    fn append(&self, path: &Path, contents: &str) -> MiccResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| map_io_error(path, e, "open file for appending"))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| map_io_error(path, e, "append to file"))
    }

    fn copy(&self, from: &Path, to: &Path) -> MiccResult<()> {
        fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(to, e, &format!("copy {}", from.display())))
    }

    fn rename(&self, from: &Path, to: &Path) -> MiccResult<()> {
        fs::rename(from, to).map_err(|e| map_io_error(to, e, &format!("move {}", from.display())))
    }

    fn create_dir_all(&self, path: &Path) -> MiccResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn remove_file(&self, path: &Path) -> MiccResult<()> {
        fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir(&self, path: &Path) -> MiccResult<()> {
        fs::remove_dir(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn remove_dir_all(&self, path: &Path) -> MiccResult<()> {
        fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn read_dir(&self, path: &Path) -> MiccResult<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| map_io_error(path, e, "read directory"))? {
            let entry = entry.map_err(|e| map_io_error(path, e, "read directory entry"))?;
            let path = entry.path();
            // follows links, so a linked directory is listed as a directory
            let is_dir = path.is_dir();
            entries.push(DirEntry { path, is_dir });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    #[cfg(unix)]
    fn symlink(&self, target: &Path, link: &Path) -> MiccResult<()> {
        std::os::unix::fs::symlink(target, link).map_err(|e| map_io_error(link, e, "create symlink"))
    }

    #[cfg(windows)]
    fn symlink(&self, target: &Path, link: &Path) -> MiccResult<()> {
        std::os::windows::fs::symlink_file(target, link)
            .map_err(|e| map_io_error(link, e, "create symlink"))
    }

    fn canonicalize(&self, path: &Path) -> MiccResult<PathBuf> {
        fs::canonicalize(path).map_err(|e| map_io_error(path, e, "resolve path"))
    }
}

/// Write `contents` to a sibling temporary file, then rename it over `path`.
///
/// On failure the original file is left untouched.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> MiccResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.micc-{}.tmp", std::process::id()));

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        map_io_error(path, e, "write file")
    })
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> MiccError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = dir.path().join("a/b/c.txt");

        fs.write(&file, b"one").unwrap();
        fs.write(&file, b"two").unwrap();

        assert_eq!(fs.read_to_string(&file).unwrap(), "two");
        // no temporary files left behind
        assert_eq!(fs.read_dir(&dir.path().join("a/b")).unwrap().len(), 1);
    }

    #[test]
    fn append_creates_file() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = dir.path().join("APPS.rst");

        fs.append(&file, "a\n").unwrap();
        fs.append(&file, "b\n").unwrap();

        assert_eq!(fs.read_to_string(&file).unwrap(), "a\nb\n");
    }

    #[test]
    fn read_dir_is_sorted() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.write(&dir.path().join("b.py"), b"").unwrap();
        fs.write(&dir.path().join("a.py"), b"").unwrap();
        fs.create_dir_all(&dir.path().join("c")).unwrap();

        let names: Vec<_> = fs
            .read_dir(dir.path())
            .unwrap()
            .iter()
            .map(|e| (e.name().to_owned(), e.is_dir))
            .collect();
        assert_eq!(
            names,
            [("a.py".into(), false), ("b.py".into(), false), ("c".into(), true)]
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let fs = LocalFilesystem::new();
        let err = fs.read(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_detected_even_when_dangling() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let target = dir.path().join("target.py");
        let link = dir.path().join("link.py");
        fs.write(&target, b"x = 1\n").unwrap();
        fs.symlink(&target, &link).unwrap();

        assert!(fs.is_symlink(&link));
        assert!(fs.is_file(&link));
        fs.remove_file(&target).unwrap();
        assert!(fs.is_symlink(&link));
        assert!(!fs.exists(&link));
    }
}
