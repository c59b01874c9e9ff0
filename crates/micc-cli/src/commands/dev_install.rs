//! Implementation of `micc dev-install` and `micc dev-uninstall`.

use micc_core::application::DevInstallArgs as CoreDevInstallArgs;

use super::Session;
use crate::cli::DevInstallArgs;
use crate::error::CliResult;

fn core_args(args: DevInstallArgs) -> CoreDevInstallArgs {
    CoreDevInstallArgs {
        site_packages: args.site_packages,
        overwrite: args.overwrite,
    }
}

pub fn install(args: DevInstallArgs, session: Session) -> CliResult<()> {
    let outcome = session.service.dev_install(&session.options, &core_args(args))?;
    session.output.success(&format!(
        "Installed {} link(s) in {}",
        outcome.links.len(),
        outcome.destination.display()
    ))?;
    Ok(())
}

pub fn uninstall(args: DevInstallArgs, session: Session) -> CliResult<()> {
    let outcome = session.service.dev_uninstall(&session.options, &core_args(args))?;
    session.output.success(&format!(
        "Removed {} link(s) from {}",
        outcome.links.len(),
        outcome.destination.display()
    ))?;
    Ok(())
}
