//! Project structure and the artifacts a project can contain.
//!
//! All artifact paths are relative to the package directory
//! `P/<package_name>/`.

use std::fmt;
use std::path::PathBuf;

use super::DomainError;

/// File extension of the source language.
pub const SOURCE_EXT: &str = "py";

/// Name of the package init file.
pub const INIT_FILE: &str = "__init__.py";

/// How the top-level source of a project is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// `P/<package_name>.py`
    Module,
    /// `P/<package_name>/__init__.py`
    Package,
    /// Created from a user-selected template list.
    UserDefined,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "module"),
            Self::Package => write!(f, "package"),
            Self::UserDefined => write!(f, "user-defined"),
        }
    }
}

/// Kinds of artifact that live inside the package directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// `cli_<name>.py`
    Application,
    /// `<name>.py`
    PyModule,
    /// `<name>/__init__.py`
    PyPackage,
    /// `f2py_<name>/<name>.f90`
    F2py,
    /// `cpp_<name>/<name>.cpp`
    Cpp,
}

impl ArtifactKind {
    /// Every module kind (all kinds except applications).
    pub const MODULES: [ArtifactKind; 4] = [Self::PyModule, Self::PyPackage, Self::F2py, Self::Cpp];

    /// Noun used in user messages ("has already an app named ...").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Application => "app",
            _ => "module",
        }
    }

    /// Label used when listing artifacts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::PyModule => "module",
            Self::PyPackage => "package",
            Self::F2py => "f2py module",
            Self::Cpp => "C++ module",
        }
    }

    /// Path of the source file that proves an artifact `name` of this kind
    /// exists.
    pub fn source_path(self, name: &str) -> PathBuf {
        match self {
            Self::Application => PathBuf::from(format!(
                "{}.{SOURCE_EXT}",
                super::names::cli_app_name(name)
            )),
            Self::PyModule => PathBuf::from(format!("{name}.{SOURCE_EXT}")),
            Self::PyPackage => PathBuf::from(name).join(INIT_FILE),
            Self::F2py => PathBuf::from(format!("f2py_{name}")).join(format!("{name}.f90")),
            Self::Cpp => PathBuf::from(format!("cpp_{name}")).join(format!("{name}.cpp")),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An application or module found in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub name: String,
    /// Source file relative to the package directory.
    pub source: PathBuf,
}

/// Classify a direct child of the package directory.
///
/// `has_file` answers whether a file exists at a path relative to the
/// package directory. Returns `None` for entries that are not artifacts
/// (the package init file, caches, data files).
pub fn classify(entry: &str, is_dir: bool, has_file: impl Fn(&PathBuf) -> bool) -> Option<Artifact> {
    let artifact = |kind: ArtifactKind, name: &str| {
        let source = kind.source_path(name);
        has_file(&source).then(|| Artifact {
            kind,
            name: name.to_owned(),
            source,
        })
    };

    if is_dir {
        if let Some(name) = entry.strip_prefix("f2py_") {
            return artifact(ArtifactKind::F2py, name);
        }
        if let Some(name) = entry.strip_prefix("cpp_") {
            return artifact(ArtifactKind::Cpp, name);
        }
        if entry == "__pycache__" {
            return None;
        }
        return artifact(ArtifactKind::PyPackage, entry);
    }

    let stem = entry.strip_suffix(&format!(".{SOURCE_EXT}"))?;
    if entry == INIT_FILE {
        return None;
    }
    match stem.strip_prefix("cli_") {
        Some(app) => Some(Artifact {
            kind: ArtifactKind::Application,
            name: app.to_owned(),
            source: PathBuf::from(entry),
        }),
        None => Some(Artifact {
            kind: ArtifactKind::PyModule,
            name: stem.to_owned(),
            source: PathBuf::from(entry),
        }),
    }
}

/// Flags of `micc add` that select the artifact kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindFlags {
    pub app: bool,
    pub group: bool,
    pub py: bool,
    pub package: bool,
    pub f2py: bool,
    pub cpp: bool,
}

impl KindFlags {
    /// The one kind selected after `--group` implies `--app` and `--package`
    /// implies `--py`.
    pub fn select(self) -> Result<ArtifactKind, DomainError> {
        let app = self.app || self.group;
        let py = self.py || self.package;
        let selected = [app, py, self.f2py, self.cpp]
            .iter()
            .filter(|flag| **flag)
            .count();
        if selected != 1 {
            return Err(DomainError::ArtifactKindRequired);
        }
        Ok(if app {
            ArtifactKind::Application
        } else if py && self.package {
            ArtifactKind::PyPackage
        } else if py {
            ArtifactKind::PyModule
        } else if self.f2py {
            ArtifactKind::F2py
        } else {
            ArtifactKind::Cpp
        })
    }
}

/// `true` for directory or file names that a development install skips.
pub fn is_mirror_excluded(name: &str, is_dir: bool) -> bool {
    if is_dir {
        name == "__pycache__" || name.starts_with("f2py_") || name.starts_with("cpp_")
    } else {
        name == ".DS_Store" || name.ends_with(".json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &PathBuf) -> bool {
        true
    }

    #[test]
    fn source_paths() {
        assert_eq!(ArtifactKind::Application.source_path("greet"), PathBuf::from("cli_greet.py"));
        assert_eq!(
            ArtifactKind::PyPackage.source_path("sub"),
            PathBuf::from("sub").join("__init__.py")
        );
        assert_eq!(
            ArtifactKind::F2py.source_path("dot"),
            PathBuf::from("f2py_dot").join("dot.f90")
        );
        assert_eq!(
            ArtifactKind::Cpp.source_path("dot"),
            PathBuf::from("cpp_dot").join("dot.cpp")
        );
    }

    #[test]
    fn classifies_entries() {
        let app = classify("cli_greet.py", false, always).unwrap();
        assert_eq!((app.kind, app.name.as_str()), (ArtifactKind::Application, "greet"));

        let module = classify("tools.py", false, always).unwrap();
        assert_eq!(module.kind, ArtifactKind::PyModule);

        let f2py = classify("f2py_dot", true, always).unwrap();
        assert_eq!((f2py.kind, f2py.name.as_str()), (ArtifactKind::F2py, "dot"));

        let cpp = classify("cpp_dot", true, always).unwrap();
        assert_eq!(cpp.kind, ArtifactKind::Cpp);

        let sub = classify("sub", true, always).unwrap();
        assert_eq!(sub.kind, ArtifactKind::PyPackage);
    }

    #[test]
    fn non_artifacts_are_ignored() {
        assert!(classify("__init__.py", false, always).is_none());
        assert!(classify("__pycache__", true, always).is_none());
        assert!(classify("data.json", false, always).is_none());
        assert!(classify("empty_dir", true, |_| false).is_none());
    }

    #[test]
    fn kind_flags_imply_and_exclude() {
        let group = KindFlags { group: true, ..Default::default() };
        assert_eq!(group.select(), Ok(ArtifactKind::Application));

        let package = KindFlags { package: true, ..Default::default() };
        assert_eq!(package.select(), Ok(ArtifactKind::PyPackage));

        let f2py = KindFlags { f2py: true, ..Default::default() };
        assert_eq!(f2py.select(), Ok(ArtifactKind::F2py));

        let none = KindFlags::default();
        assert_eq!(none.select(), Err(DomainError::ArtifactKindRequired));

        let two = KindFlags { app: true, cpp: true, ..Default::default() };
        assert_eq!(two.select(), Err(DomainError::ArtifactKindRequired));
    }

    #[test]
    fn mirror_exclusions() {
        assert!(is_mirror_excluded("__pycache__", true));
        assert!(is_mirror_excluded("f2py_dot", true));
        assert!(is_mirror_excluded("cpp_dot", true));
        assert!(is_mirror_excluded("micc.json", false));
        assert!(is_mirror_excluded(".DS_Store", false));
        assert!(!is_mirror_excluded("sub", true));
        assert!(!is_mirror_excluded("mod.py", false));
    }
}
