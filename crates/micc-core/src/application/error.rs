//! Application layer errors.
//!
//! These errors represent failures in orchestration: unmet preconditions,
//! template engine failures, collaborator exit codes and I/O. Rule
//! violations in pure logic are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ArtifactKind;
use crate::error::{ErrorCategory, ReturnCode};

/// Errors that occur during command orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    // ========================================================================
    // Preconditions
    // ========================================================================
    #[error("Not a project directory ({path})")]
    NotInProject { path: PathBuf },

    #[error("Cannot create project in non-empty directory ({path})")]
    NotEmpty { path: PathBuf },

    #[error("You are trying to create a new project ({path}) inside an existing project ({parent})")]
    NestedProjectRefused { path: PathBuf, parent: PathBuf },

    #[error("Project {project} has already {article} {noun} named {name}.", article = article(.kind), noun = .kind.noun())]
    ArtifactExists {
        project: String,
        kind: ArtifactKind,
        name: String,
    },

    #[error("Cannot set version: {path} does not exist")]
    VersionLocationMissing { path: PathBuf },

    #[error("Cannot add modules or apps to a module-structure project ({project})")]
    ModuleStructureRefused { project: String },

    #[error("Key '{key}' missing in {path}")]
    KeyMissing { key: String, path: PathBuf },

    // ========================================================================
    // Template engine
    // ========================================================================
    #[error("Template not found: {template}")]
    TemplateMissing { template: String },

    #[error("Post-generation hook of template {template} failed with exit code {code}")]
    HookFailed { template: String, code: i32 },

    #[error("Invalid template manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("{} existing file(s) not overwritten", .paths.len())]
    CollisionRefused { paths: Vec<PathBuf> },

    // ========================================================================
    // External collaborators
    // ========================================================================
    #[error("Command '{command}' failed with exit code {code}")]
    CollaboratorFailed { command: String, code: i32 },

    #[error("Could not run '{program}': {reason}")]
    CollaboratorUnavailable { program: String, reason: String },

    // ========================================================================
    // I/O and documents
    // ========================================================================
    #[error("'{pattern}' not found in {path}")]
    PatternNotFound { path: PathBuf, pattern: String },

    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    #[error("Cannot process {path}: {reason}")]
    Document { path: PathBuf, reason: String },
}

fn article(kind: &ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Application => "an",
        _ => "a",
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotInProject { .. } => vec![
                "Run micc inside a project directory".into(),
                "Or pass the project directory with --project-path".into(),
            ],
            Self::NotEmpty { .. } => vec!["Choose an empty or non-existing directory".into()],
            Self::NestedProjectRefused { .. } => {
                vec!["Pass --allow-nesting to create a project inside a project".into()]
            }
            Self::ArtifactExists { .. } => vec!["Choose a different name".into()],
            Self::ModuleStructureRefused { .. } => {
                vec!["Run 'micc convert-to-package' first".into()]
            }
            Self::TemplateMissing { .. } => vec![
                "Check the template name or path".into(),
                "Set MICC_TEMPLATES_DIR to point at a template library".into(),
            ],
            Self::CollisionRefused { paths } => {
                let mut hints: Vec<String> = paths
                    .iter()
                    .map(|p| format!("Not overwritten: {}", p.display()))
                    .collect();
                hints.push("Use --overwrite to overwrite existing files".into());
                hints.push("Use --backup to keep a copy (<file>.bak) and overwrite".into());
                hints
            }
            Self::CollaboratorUnavailable { program, .. } => {
                vec![format!("Make sure '{program}' is installed and on PATH")]
            }
            Self::Filesystem { .. } => vec!["Check that you have write permissions".into()],
            _ => vec![],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotInProject { .. }
            | Self::NotEmpty { .. }
            | Self::NestedProjectRefused { .. }
            | Self::ArtifactExists { .. }
            | Self::VersionLocationMissing { .. }
            | Self::ModuleStructureRefused { .. } => ErrorCategory::Precondition,
            Self::TemplateMissing { .. } => ErrorCategory::Template(ReturnCode::TemplateMissing),
            Self::HookFailed { .. } => ErrorCategory::Template(ReturnCode::HookFailed),
            Self::InvalidManifest { .. } => ErrorCategory::Template(ReturnCode::TemplateMissing),
            Self::CollisionRefused { .. } => ErrorCategory::Collision,
            Self::CollaboratorFailed { code, .. } => ErrorCategory::Collaborator(*code),
            Self::CollaboratorUnavailable { .. }
            | Self::KeyMissing { .. }
            | Self::PatternNotFound { .. }
            | Self::Filesystem { .. }
            | Self::Document { .. } => ErrorCategory::Fatal,
        }
    }
}
