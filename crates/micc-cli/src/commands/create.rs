//! Implementation of the `micc create` command.

use tracing::instrument;

use micc_core::application::CreateArgs as CoreCreateArgs;
use micc_core::domain::Structure;

use super::{Session, shown};
use crate::cli::CreateArgs;
use crate::error::CliResult;

/// Execute `micc create`.
///
/// The project directory is `--project-path`, joined with `NAME` if given.
#[instrument(skip_all)]
pub fn execute(args: CreateArgs, session: Session) -> CliResult<()> {
    let Session {
        service,
        mut options,
        output,
    } = session;

    if let Some(name) = &args.name {
        options.project_path = options.project_path.join(name);
    }
    options.allow_nesting = args.allow_nesting;

    let core_args = CoreCreateArgs {
        structure: if args.package {
            Structure::Package
        } else {
            Structure::Module
        },
        templates: args.templates,
        license: args.license,
        description: args.description,
        python_version: args.python_version,
        micc_file: args.micc_file,
    };

    let outcome = service.create(&options, &core_args)?;

    output.success(&format!(
        "Created {} project {} at {}",
        outcome.structure,
        outcome.name,
        shown(&outcome.path)
    ))?;
    output.print(&format!("  package      : {}", outcome.package_name))?;
    output.print(&format!("  files written: {}", outcome.report.written.len()))?;
    output.print("")?;
    output.header("Next steps:")?;
    output.print(&format!("  cd {}", shown(&outcome.path)))?;
    output.print("  micc info")?;
    Ok(())
}
