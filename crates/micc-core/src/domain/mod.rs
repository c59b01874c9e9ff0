//! Domain layer: the rules of a micc project, free of I/O.
//!
//! ## Design Principles
//!
//! - **Pure functions**: everything here is deterministic given its inputs
//! - **No filesystem**: paths are computed, never touched
//! - **No async**: Domain logic is synchronous
//!
//! Files, documents and processes are reached through the ports in
//! [`crate::application::ports`].

pub mod collision;
pub mod defaults;
pub mod error;
pub mod names;
pub mod parameters;
pub mod structure;
pub mod text;
pub mod version;
pub mod version_range;

pub use collision::{CollisionPolicy, MergeDecision, decide};
pub use error::DomainError;
pub use names::{canonicalize, cli_app_name, verify_module_name, verify_project_name};
pub use parameters::{ParameterSpec, ParameterType, Parameters, resolve};
pub use structure::{Artifact, ArtifactKind, KindFlags, Structure};
pub use text::Placement;
pub use version::{BumpRule, bump, parse_version, select_rule};
pub use version_range::{VersionRange, convert_caret_specification, version_range};

pub use semver::Version;
