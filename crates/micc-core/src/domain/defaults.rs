//! Built-in template lists, licenses and parameter defaults.

use super::structure::{ArtifactKind, Structure};

/// Description used when `create` is given none.
pub const DEFAULT_DESCRIPTION: &str = "<Enter a one-sentence description of this project here.>";

/// Minimal Python version used when `create` is given none.
pub const DEFAULT_PYTHON_VERSION: &str = "3.7";

/// Template overlaid by `convert-to-package`.
pub const PACKAGE_DOCS_TEMPLATE: &str = "package-general-docs";

/// License names offered to `create --lic`; matched by prefix.
pub const LICENSES: [&str; 6] = [
    "MIT license",
    "BSD license",
    "ISC license",
    "Apache Software License 2.0",
    "GNU General Public License v3",
    "Not open source",
];

/// Pick the license whose name starts with `lic`, or the first one.
pub fn license_name(lic: &str) -> &'static str {
    LICENSES
        .iter()
        .copied()
        .find(|name| name.starts_with(lic))
        .unwrap_or(LICENSES[0])
}

/// Templates applied by `create` for a structure.
pub fn create_templates(structure: Structure) -> Vec<String> {
    let names: &[&str] = match structure {
        Structure::Module => &["package-base", "package-simple", "package-simple-docs"],
        Structure::Package | Structure::UserDefined => &[
            "package-base",
            "package-general",
            "package-simple-docs",
            "package-general-docs",
        ],
    };
    names.iter().map(|s| (*s).to_owned()).collect()
}

/// Template applied by `add` for an artifact kind.
pub fn add_template(kind: ArtifactKind, group: bool) -> &'static str {
    match kind {
        ArtifactKind::Application if group => "app-sub-commands",
        ArtifactKind::Application => "app-simple",
        ArtifactKind::PyModule | ArtifactKind::PyPackage => "module-py",
        ArtifactKind::F2py => "module-f2py",
        ArtifactKind::Cpp => "module-cpp",
    }
}
