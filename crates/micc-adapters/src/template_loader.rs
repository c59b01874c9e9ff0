//! Filesystem-based template library.
//!
//! Locates templates by name or path, parses their `template.toml`
//! manifests and renders them with [`crate::renderer`].
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── cmake_tools/                  ← support files for native modules
//! ├── package-base/
//! │   ├── template.toml             ← manifest (required)
//! │   ├── hooks/
//! │   │   └── post_gen_project.sh   ← optional hook
//! │   └── {{project_name}}/         ← root placeholder, maps onto the target
//! │       ├── pyproject.toml
//! │       └── README.rst
//! └── app-simple/
//!     ├── template.toml
//!     └── {{project_name}}/
//!         └── {{package_name}}/
//!             └── {{cli_app_name}}.py
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! name        = "package-base"
//! description = "Packaging manifest, README and license"   # optional
//! hook        = "hooks/post_gen_project.sh"                # optional
//!
//! [parameters.project_name]
//! prompt  = "Project name"       # optional
//! default = "my-project"         # optional
//! type    = "string"             # optional: string | bool | int
//!
//! # shorthand for a parameter that only has a default
//! [parameters]
//! full_name = "John Doe"
//! ```
//!
//! Parameters are resolved in manifest order.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use micc_core::application::ApplicationError;
use micc_core::application::ports::{RenderedFile, TemplateManifest, TemplateSource};
use micc_core::domain::{ParameterSpec, ParameterType, Parameters};
use micc_core::error::{MiccError, MiccResult};

use crate::renderer;

/// Environment variable pointing at a template library.
pub const TEMPLATES_DIR_ENV: &str = "MICC_TEMPLATES_DIR";

/// Manifest file name inside every template.
pub const MANIFEST_FILE: &str = "template.toml";

/// Support directory injected as `path_to_cmake_tools`.
pub const CMAKE_TOOLS_DIR: &str = "cmake_tools";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Raw `template.toml` as deserialized by serde.
#[derive(Debug, Deserialize, Clone)]
pub struct ManifestFile {
    pub template: TemplateSection,
    /// Kept as a table so that manifest order survives (`preserve_order`).
    #[serde(default)]
    pub parameters: toml::Table,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub name: String,
    pub description: Option<String>,
    /// Hook script, relative to the template directory.
    pub hook: Option<PathBuf>,
}

/// One entry under `[parameters.<name>]`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParameterEntry {
    pub prompt: Option<String>,
    pub default: Option<toml::Value>,
    #[serde(rename = "type")]
    pub kind: Option<ParameterType>,
}

impl ManifestFile {
    /// Parse the text of a `template.toml`.
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Parameter declarations in manifest order.
    pub fn parameter_specs(&self) -> Result<Vec<ParameterSpec>, String> {
        self.parameters
            .iter()
            .map(|(name, value)| {
                let entry = match value {
                    toml::Value::Table(_) => value
                        .clone()
                        .try_into::<ParameterEntry>()
                        .map_err(|e| format!("parameter '{name}': {e}"))?,
                    scalar => ParameterEntry {
                        default: Some(scalar.clone()),
                        ..Default::default()
                    },
                };
                Ok(ParameterSpec {
                    name: name.clone(),
                    prompt: entry.prompt,
                    default: entry.default.as_ref().map(scalar_text).transpose()?,
                    kind: entry.kind.unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn scalar_text(value: &toml::Value) -> Result<String, String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        other => Err(format!("unsupported default value {other}")),
    }
}

// ── Library ───────────────────────────────────────────────────────────────────

/// A directory of templates, plus lookup of templates given by path.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    dir: Option<PathBuf>,
}

impl TemplateLibrary {
    /// Use `dir` as the library.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Find the library: `$MICC_TEMPLATES_DIR`, `./templates`,
    /// `<exe dir>/templates`, then the templates shipped with this crate.
    ///
    /// Without a library only path references can be loaded.
    pub fn discover() -> Self {
        let dir = library_candidates().into_iter().find(|dir| dir.is_dir());
        match &dir {
            Some(dir) => debug!("template library: {}", dir.display()),
            None => debug!("no template library found"),
        }
        Self { dir }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Directory of the template `reference`.
    ///
    /// Absolute paths and relative paths containing a separator are used
    /// as given; anything else is a name in the library.
    pub fn locate(&self, reference: &str) -> MiccResult<PathBuf> {
        let given = Path::new(reference);
        let dir = if given.is_absolute() || reference.contains('/') || reference.contains(std::path::MAIN_SEPARATOR) {
            Some(given.to_path_buf())
        } else {
            self.dir.as_ref().map(|lib| lib.join(reference))
        };
        match dir {
            Some(dir) if dir.join(MANIFEST_FILE).is_file() => Ok(dir),
            _ => Err(ApplicationError::TemplateMissing {
                template: reference.to_owned(),
            }
            .into()),
        }
    }
}

fn library_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = env::var_os(TEMPLATES_DIR_ENV).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(dir));
    }
    candidates.push(PathBuf::from("templates"));
    if let Ok(exe) = env::current_exe()
        && let Some(parent) = exe.parent()
    {
        candidates.push(parent.join("templates"));
    }
    candidates.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"));
    candidates
}

fn invalid_manifest(path: &Path, reason: impl Into<String>) -> MiccError {
    ApplicationError::InvalidManifest {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

impl TemplateSource for TemplateLibrary {
    #[instrument(skip(self))]
    fn load(&self, reference: &str) -> MiccResult<TemplateManifest> {
        let root = self.locate(reference)?;
        let manifest_path = root.join(MANIFEST_FILE);
        let text = fs::read_to_string(&manifest_path)
            .map_err(|e| invalid_manifest(&manifest_path, format!("failed to read: {e}")))?;
        let file = ManifestFile::parse(&text).map_err(|e| invalid_manifest(&manifest_path, e))?;
        let parameters = file
            .parameter_specs()
            .map_err(|e| invalid_manifest(&manifest_path, e))?;

        if let Some(hook) = &file.template.hook
            && !root.join(hook).is_file()
        {
            return Err(invalid_manifest(
                &manifest_path,
                format!("hook {} not found", hook.display()),
            ));
        }

        debug!(
            name = %file.template.name,
            parameters = parameters.len(),
            "loaded template manifest"
        );
        Ok(TemplateManifest {
            name: file.template.name,
            description: file.template.description.unwrap_or_default(),
            parameters,
            hook: file.template.hook,
            root,
        })
    }

    fn render(&self, template: &TemplateManifest, params: &Parameters) -> MiccResult<Vec<RenderedFile>> {
        let root = renderer::placeholder_root(&template.root)?;
        renderer::render_tree(&root, params)
    }

    fn render_hook(&self, template: &TemplateManifest, params: &Parameters) -> MiccResult<Option<String>> {
        let Some(hook) = &template.hook else {
            return Ok(None);
        };
        let path = template.root.join(hook);
        let script = fs::read_to_string(&path).map_err(|e| ApplicationError::Filesystem {
            path: path.clone(),
            reason: format!("Failed to read hook: {e}"),
        })?;
        Ok(Some(renderer::render_text(&script, params)?))
    }

    fn cmake_tools(&self) -> Option<PathBuf> {
        let tools = self.dir.as_ref()?.join(CMAKE_TOOLS_DIR);
        tools.is_dir().then(|| fs::canonicalize(&tools).unwrap_or(tools))
    }
}

// ── tests ──────────────────────────────────────────────────────────────────
