//! Implementation of the `micc convert-to-package` command.

use tracing::instrument;

use micc_core::application::ConvertOutcome;
use micc_core::domain::CollisionPolicy;

use super::Session;
use crate::cli::ConvertArgs;
use crate::error::CliResult;

#[instrument(skip_all)]
pub fn execute(args: ConvertArgs, session: Session) -> CliResult<()> {
    let options = session
        .options
        .with_policy(CollisionPolicy::from_flags(args.collision.overwrite, args.collision.backup));
    let output = &session.output;

    match session.service.convert_to_package(&options) {
        Ok(ConvertOutcome::AlreadyPackage { name }) => {
            output.warning(&format!("Project {name} is already a package, nothing to do"))?;
        }
        Ok(ConvertOutcome::Converted { name, report }) => {
            output.success(&format!("Converted project {name} to a package"))?;
            if !report.backed_up.is_empty() {
                output.warning(&format!(
                    "{} pre-existing file(s) saved as .bak",
                    report.backed_up.len()
                ))?;
            }
        }
        Err(e) if e.is_collision() => {
            output.info(
                "Overwriting docs/index.rst is normally safe: convert-to-package only adds \
                 documentation files. Rerun with --overwrite, or with --backup to keep copies.",
            )?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
