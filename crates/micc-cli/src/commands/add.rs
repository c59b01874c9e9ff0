//! Implementation of the `micc add` command.

use tracing::instrument;

use micc_core::application::AddArgs as CoreAddArgs;
use micc_core::domain::{ArtifactKind, CollisionPolicy, KindFlags};

use super::{Session, shown};
use crate::cli::AddArgs;
use crate::error::CliResult;

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(args: AddArgs, session: Session) -> CliResult<()> {
    let kind = KindFlags {
        app: args.app,
        group: args.group,
        py: args.py,
        package: args.package,
        f2py: args.f2py,
        cpp: args.cpp,
    }
    .select()
    .map_err(micc_core::error::MiccError::from)?;

    let options = session
        .options
        .with_policy(CollisionPolicy::from_flags(args.collision.overwrite, args.collision.backup));
    let core_args = CoreAddArgs {
        name: args.name,
        kind,
        group: args.group,
        templates: args.templates,
    };

    let outcome = session.service.add(&options, &core_args)?;
    let output = &session.output;

    output.success(&format!("Added {} {}", outcome.kind, outcome.name))?;
    output.print(&format!("  source: {}", shown(&outcome.source)))?;
    if !outcome.report.backed_up.is_empty() {
        output.warning(&format!(
            "{} pre-existing file(s) saved as .bak",
            outcome.report.backed_up.len()
        ))?;
    }
    match outcome.kind {
        ArtifactKind::Application => {
            output.print(&format!("  command: {} (after installing the package)", outcome.name))?;
        }
        ArtifactKind::F2py | ArtifactKind::Cpp => {
            output.info("Build the extension module with 'micc-build'")?;
        }
        ArtifactKind::PyModule | ArtifactKind::PyPackage => {}
    }
    Ok(())
}
