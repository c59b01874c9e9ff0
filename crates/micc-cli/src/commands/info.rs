//! Implementation of the `micc info` command.
//!
//! | Verbosity | Shown                                     |
//! |-----------|-------------------------------------------|
//! | 1         | name, path, package name, version         |
//! | 2         | + structure and top-level source file     |
//! | 3         | + applications and modules                |

use micc_core::application::ProjectInfo;

use super::{Session, shown};
use crate::cli::InfoArgs;
use crate::error::CliResult;
use crate::output::OutputManager;

const WIDTH: usize = 15;

pub fn execute(args: InfoArgs, session: Session) -> CliResult<()> {
    let info = session.service.info(&session.options)?;
    let output = &session.output;

    if args.name {
        output.value(&info.package_name)?;
        return Ok(());
    }
    if args.version {
        output.value(&info.version)?;
        return Ok(());
    }
    report(&info, session.options.verbosity, output)
}

fn report(info: &ProjectInfo, verbosity: u8, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Project {}", info.name))?;
    output.field("path", &info.path.display().to_string(), WIDTH)?;
    output.field("package name", &info.package_name, WIDTH)?;
    output.field("version", &info.version, WIDTH)?;

    if verbosity >= 2 {
        output.field("structure", &info.structure.to_string(), WIDTH)?;
        output.field("source file", &shown(&info.source_file), WIDTH)?;
        if info.both_forms {
            output.warning("Found both a module file and a package directory")?;
        }
    }

    if verbosity >= 3 {
        if info.artifacts.is_empty() {
            output.print("  (no applications or modules)")?;
        }
        for artifact in &info.artifacts {
            output.field(
                artifact.kind.label(),
                &format!("{} ({})", artifact.name, artifact.source.display()),
                WIDTH,
            )?;
        }
    }
    Ok(())
}
