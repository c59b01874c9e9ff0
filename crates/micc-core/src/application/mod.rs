//! Application layer for micc.
//!
//! This layer contains:
//! - **Commands**: use case orchestration (`CommandService`)
//! - **Project model**: the on-disk project and its invariants
//! - **Expander**: template chains under a collision policy
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Pure rules (names, versions, merge decisions) live in `crate::domain`.

pub mod collaborators;
pub mod commands;
pub mod error;
pub mod expander;
pub mod paths;
pub mod ports;
pub mod project;
pub mod timing;

pub use commands::{
    AddArgs, AddOutcome, CommandService, ConvertOutcome, CreateArgs, CreateOutcome, DevInstallArgs,
    DevInstallOutcome, GlobalOptions, ProjectInfo, TagOutcome, VersionArgs, VersionOutcome,
};
pub use error::ApplicationError;
pub use expander::{ExpansionReport, TemplateExpander};
pub use project::{NewProject, Project};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, LogSink, ManifestDocument, ManifestStore, ProcessRunner, Prompter, TemplateSource};
