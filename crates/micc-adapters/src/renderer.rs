//! `{{ name }}` substitution over paths and file bodies.
//!
//! Only placeholders whose content is a plain identifier are touched, so
//! brace-heavy sources such as C++ initializer lists pass through verbatim.
//! An identifier without a value fails with `UnresolvedParameter`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use micc_core::application::ApplicationError;
use micc_core::application::ports::RenderedFile;
use micc_core::domain::{DomainError, Parameters};
use micc_core::error::MiccResult;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute every `{{ identifier }}` in `text`.
pub fn render_text(text: &str, params: &Parameters) -> Result<String, DomainError> {
    render_with(text, params, |value| value.to_owned())
}

/// Like [`render_text`], with every value escaped for a TOML basic string.
///
/// Placeholders in `.toml` templates must sit inside `"..."` literals.
pub fn render_toml_text(text: &str, params: &Parameters) -> Result<String, DomainError> {
    render_with(text, params, escape_toml)
}

fn render_with(text: &str, params: &Parameters, escape: fn(&str) -> String) -> Result<String, DomainError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        let inner = after[..end].trim();
        out.push_str(&rest[..start]);
        if is_identifier(inner) {
            let value = params
                .get(inner)
                .ok_or_else(|| DomainError::UnresolvedParameter { name: inner.to_owned() })?;
            out.push_str(&escape(value));
        } else {
            out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]);
        }
        rest = &after[end + CLOSE.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

fn escape_toml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Render each component of a relative path.
///
/// Returns `None` when a component renders empty; such entries are dropped
/// from the output.
pub fn render_path(path: &Path, params: &Parameters) -> Result<Option<PathBuf>, DomainError> {
    let mut rendered = PathBuf::new();
    for component in path.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        let part = render_text(&part.to_string_lossy(), params)?;
        if part.trim().is_empty() {
            return Ok(None);
        }
        rendered.push(part);
    }
    Ok(Some(rendered))
}

/// The single top-level directory of `template_root` whose name holds a
/// placeholder; it maps onto the target directory.
pub fn placeholder_root(template_root: &Path) -> MiccResult<PathBuf> {
    let invalid = |reason: String| ApplicationError::InvalidManifest {
        path: template_root.to_path_buf(),
        reason,
    };
    let mut roots = Vec::new();
    let entries = fs::read_dir(template_root).map_err(|e| invalid(format!("cannot read template: {e}")))?;
    for entry in entries {
        let entry = entry.map_err(|e| invalid(format!("cannot read template: {e}")))?;
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_string_lossy().contains(OPEN) {
            roots.push(path);
        }
    }
    match roots.len() {
        1 => Ok(roots.remove(0)),
        0 => Err(invalid("no root placeholder directory".into()).into()),
        n => Err(invalid(format!("{n} root placeholder directories, expected one")).into()),
    }
}

/// Render every file below the placeholder root `root`.
///
/// Paths in the result are relative to the target directory and sorted.
/// Text files have their bodies rendered; other files are copied as bytes.
#[instrument(skip(params), fields(root = %root.display()))]
pub fn render_tree(root: &Path, params: &Parameters) -> MiccResult<Vec<RenderedFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ApplicationError::InvalidManifest {
            path: root.to_path_buf(),
            reason: format!("directory walk error: {e}"),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let source = entry.path();
        let relative = source.strip_prefix(root).map_err(|_| ApplicationError::Filesystem {
            path: source.to_path_buf(),
            reason: format!("not below {}", root.display()),
        })?;
        let Some(path) = render_path(relative, params)? else {
            trace!("dropping {}", relative.display());
            continue;
        };

        let bytes = fs::read(source).map_err(|e| ApplicationError::Filesystem {
            path: source.to_path_buf(),
            reason: format!("Failed to read template file: {e}"),
        })?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let contents = match String::from_utf8(bytes) {
            Ok(text) if is_toml => render_toml_text(&text, params)?.into_bytes(),
            Ok(text) => render_text(&text, params)?.into_bytes(),
            Err(binary) => binary.into_bytes(),
        };
        files.push(RenderedFile { path, contents });
    }
    debug!(count = files.len(), "rendered template files");
    Ok(files)
}
