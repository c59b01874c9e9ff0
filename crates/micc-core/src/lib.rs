//! micc core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for micc, the
//! scaffolding and lifecycle tool for Python projects, following hexagonal
//! (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             micc-cli (CLI)              │
//! │     (Builds GlobalOptions, renders)     │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (CommandService, Project, Expander)    │
//! │         Orchestrates Commands           │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, ManifestStore, Templates,  │
//! │  ProcessRunner, Prompter, LogSink)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      micc-adapters (Infrastructure)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (names, versions, parameters, merge)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use micc_core::application::{CommandService, GlobalOptions};
//!
//! # fn wire(fs: Arc<dyn micc_core::application::ports::Filesystem>,
//! #         manifests: Arc<dyn micc_core::application::ports::ManifestStore>,
//! #         templates: Arc<dyn micc_core::application::ports::TemplateSource>,
//! #         runner: Arc<dyn micc_core::application::ports::ProcessRunner>,
//! #         log: Arc<dyn micc_core::application::ports::LogSink>) {
//! let service = CommandService::new(fs, manifests, templates, runner, log);
//! let options = GlobalOptions::new("./my-project");
//! let info = service.info(&options).unwrap();
//! println!("{} {}", info.name, info.version);
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CommandService, GlobalOptions, Project,
        ports::{
            Filesystem, LogSink, ManifestDocument, ManifestStore, ProcessRunner, Prompter,
            TemplateSource,
        },
    };
    pub use crate::domain::{
        ArtifactKind, BumpRule, CollisionPolicy, ParameterSpec, Parameters, Structure,
        VersionRange, canonicalize, verify_project_name,
    };
    pub use crate::error::{ErrorCategory, MiccError, MiccResult, ReturnCode};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
