//! Infrastructure adapters for micc.
//!
//! This crate implements the ports defined in `micc_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod manifest;
pub mod process;
pub mod renderer;
pub mod template_loader;

// Re-export commonly used adapters
pub use filesystem::LocalFilesystem;
pub use manifest::{TomlDocument, TomlManifestStore};
pub use process::SystemProcessRunner;
pub use template_loader::TemplateLibrary;
