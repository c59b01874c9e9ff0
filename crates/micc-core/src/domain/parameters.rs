//! Template parameters and their three-layer resolution.
//!
//! Resolution order (highest priority first):
//!
//! 1. caller-supplied overrides,
//! 2. manifest defaults,
//! 3. an interactive prompt (only when a prompt function is supplied).
//!
//! Derived parameters are computed afterwards and shadow anything the caller
//! passed under the same name.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DomainError, names};

/// Declared type of a template parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Bool,
    Int,
}

impl ParameterType {
    /// Normalise `value` for this type, rejecting values that do not fit.
    pub fn coerce(self, name: &str, value: &str) -> Result<String, DomainError> {
        let invalid = |expected| DomainError::InvalidParameterValue {
            name: name.into(),
            value: value.into(),
            expected,
        };
        match self {
            Self::String => Ok(value.to_owned()),
            Self::Bool => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok("true".into()),
                "false" | "no" | "n" | "0" => Ok("false".into()),
                _ => Err(invalid("a boolean (yes/no)")),
            },
            Self::Int => value
                .trim()
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|_| invalid("an integer")),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
        }
    }
}

/// One parameter as declared by a template manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub prompt: Option<String>,
    pub default: Option<String>,
    pub kind: ParameterType,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            default: None,
            kind: ParameterType::String,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Text shown when asking for this parameter.
    pub fn prompt_text(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.name)
    }
}

/// An ordered name → value mapping.
///
/// Insertion order is kept so that rendered `micc.json` files and debug logs
/// list parameters in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name`, keeping its original position if it was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert only if `name` is not set yet.
    pub fn insert_default(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.contains(&name) {
            self.entries.push((name, value.into()));
        }
    }

    /// Overlay `other` on top of `self`; values in `other` win.
    pub fn merge(&mut self, other: &Parameters) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `micc.json` document.
    ///
    /// Each value is either a plain scalar or an object carrying a `default`
    /// key (the preferences format); other entries are ignored.
    pub fn from_json(text: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| DomainError::InvalidParameterFile {
                reason: e.to_string(),
            })?;
        let serde_json::Value::Object(map) = value else {
            return Err(DomainError::InvalidParameterFile {
                reason: "top-level value must be an object".into(),
            });
        };

        let mut params = Parameters::new();
        for (name, value) in map {
            let scalar = match value {
                serde_json::Value::Object(mut description) => description.remove("default"),
                other => Some(other),
            };
            match scalar {
                Some(serde_json::Value::String(s)) => params.insert(name, s),
                Some(serde_json::Value::Bool(b)) => params.insert(name, b.to_string()),
                Some(serde_json::Value::Number(n)) => params.insert(name, n.to_string()),
                _ => {}
            }
        }
        Ok(params)
    }

    /// Render as a pretty-printed JSON object.
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(k, v)| (k.to_owned(), serde_json::Value::String(v.to_owned())))
            .collect();
        // A map of strings always serializes.
        serde_json::to_string_pretty(&map).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Resolve `specs` against `overrides`, falling back to defaults and then to
/// `prompt`.
///
/// Overrides for names the manifest does not declare are passed through, so
/// that parameters flow from one template to the next.
pub fn resolve<F>(
    specs: &[ParameterSpec],
    overrides: &Parameters,
    mut prompt: Option<F>,
) -> Result<Parameters, DomainError>
where
    F: FnMut(&ParameterSpec) -> Result<String, DomainError>,
{
    let mut resolved = Parameters::new();
    for spec in specs {
        let raw = if let Some(value) = overrides.get(&spec.name) {
            value.to_owned()
        } else if let Some(default) = &spec.default {
            default.clone()
        } else if let Some(ask) = prompt.as_mut() {
            ask(spec)?
        } else {
            return Err(DomainError::UnresolvedParameter {
                name: spec.name.clone(),
            });
        };
        resolved.insert(spec.name.clone(), spec.kind.coerce(&spec.name, &raw)?);
    }

    for (name, value) in overrides.iter() {
        resolved.insert_default(name, value);
    }

    derive(&mut resolved);
    Ok(resolved)
}

/// Add the derived parameters, overwriting manual entries.
pub fn derive(params: &mut Parameters) {
    if let Some(project) = params.get("project_name").map(names::canonicalize) {
        params.insert("package_name", project);
    }
    if let Some(app) = params.get("app_name").map(names::cli_app_name) {
        params.insert("cli_app_name", app);
    }
}
