// ============================================================================
// domain/error.rs - RULE VIOLATIONS IN PURE LOGIC
// ============================================================================

use thiserror::Error;

use crate::error::{ErrorCategory, ReturnCode};

/// Root domain error type.
///
/// All errors are:
/// - Cloneable
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Names
    // ========================================================================
    #[error("Invalid project name ({name})")]
    InvalidProjectName { name: String },

    #[error("Not a valid {kind} name ({name})")]
    InvalidArtifactName { kind: &'static str, name: String },

    // ========================================================================
    // Versions
    // ========================================================================
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid version constraint '{spec}'")]
    InvalidConstraint { spec: String },

    #[error("Both a version rule ({rule}) and --major|--minor|--patch specified")]
    AmbiguousArgs { rule: String },

    // ========================================================================
    // Command flags
    // ========================================================================
    #[error("Specify one and only one of --app, --py, --f2py, --cpp")]
    ArtifactKindRequired,

    #[error("Conflicting options: {reason}")]
    ConflictingOptions { reason: String },

    // ========================================================================
    // Template parameters
    // ========================================================================
    #[error("Template parameter '{name}' has no value and no default")]
    UnresolvedParameter { name: String },

    #[error("Invalid value '{value}' for template parameter '{name}': expected {expected}")]
    InvalidParameterValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid parameter file: {reason}")]
    InvalidParameterFile { reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectName { .. } => vec![
                "A project name must start with a letter [a-zA-Z]".into(),
                "and contain only letters, digits, hyphens and underscores".into(),
            ],
            Self::InvalidArtifactName { kind: "app", .. } => vec![
                "Valid app names start with a letter [a-zA-Z]".into(),
                "and contain only letters, digits, hyphens and underscores".into(),
            ],
            Self::InvalidArtifactName { .. } => vec![
                "Valid module names start with a letter [a-zA-Z]".into(),
                "and contain only lowercase letters, digits and underscores".into(),
            ],
            Self::InvalidVersion { .. } => vec![
                "Use a rule (major, minor, patch, premajor, preminor, prepatch, prerelease)".into(),
                "or a semantic version such as 1.2.3 or 1.2.3-rc.1".into(),
            ],
            Self::AmbiguousArgs { .. } => {
                vec!["Pass either a RULE or one of --major/--minor/--patch, not both".into()]
            }
            Self::ArtifactKindRequired => vec![
                "--group implies --app and --package implies --py".into(),
                "Example: micc add mymodule --py".into(),
            ],
            Self::UnresolvedParameter { name } => vec![
                format!("Provide a value for '{name}' in micc.json or via --micc-file"),
                "Or run micc from a terminal to be prompted".into(),
            ],
            _ => vec![],
        }
    }

    /// Error category for CLI display styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnresolvedParameter { .. } => {
                ErrorCategory::Template(ReturnCode::UnresolvedParameter)
            }
            _ => ErrorCategory::UserInput,
        }
    }
}
