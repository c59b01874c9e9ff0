//! Command handlers.
//!
//! Responsibility of every handler: translate CLI arguments into the core
//! command arguments, call the [`CommandService`], and display results. No
//! business logic lives here.
//!
//! [`CommandService`]: micc_core::application::CommandService

pub mod add;
pub mod completions;
pub mod convert;
pub mod create;
pub mod dev_install;
pub mod docs;
pub mod info;
pub mod tag;
pub mod version;

use micc_core::application::{CommandService, GlobalOptions};

use crate::output::OutputManager;

/// Everything a handler needs, fixed for one invocation.
pub struct Session {
    pub service: CommandService,
    pub options: GlobalOptions,
    pub output: OutputManager,
}

/// Display path relative to the current directory when possible.
pub(crate) fn shown(path: &std::path::Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(|p| p.display().to_string()))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}
