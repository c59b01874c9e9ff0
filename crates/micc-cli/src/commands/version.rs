//! Implementation of the `micc version` command.

use tracing::instrument;

use micc_core::application::{VersionArgs as CoreVersionArgs, VersionOutcome};

use super::Session;
use crate::cli::VersionArgs;
use crate::error::CliResult;

#[instrument(skip_all)]
pub fn execute(args: VersionArgs, session: Session) -> CliResult<()> {
    let core_args = CoreVersionArgs {
        rule: args.rule,
        major: args.major,
        minor: args.minor,
        patch: args.patch,
        tag: args.tag,
        dry_run: args.dry_run,
        poetry: args.poetry,
    };
    let outcome = session.service.version(&session.options, &core_args)?;
    let output = &session.output;

    match outcome {
        VersionOutcome::Current { name, version } => {
            if args.short {
                output.value(&version)?;
            } else {
                output.value(&format!("Project {name} version {version}"))?;
            }
        }
        VersionOutcome::Bumped {
            name,
            from,
            to,
            dry_run,
            tag,
        } => {
            if args.short {
                output.value(&to)?;
            } else if dry_run {
                output.info(&format!("({name}) {from} -> {to} (dry run, nothing changed)"))?;
            } else {
                output.success(&format!("({name}) {from} -> {to}"))?;
            }
            match tag {
                Some(tag) if tag.pushed => output.success(&format!("Created and pushed tag {}", tag.tag))?,
                Some(tag) => output.warning(&format!(
                    "Created tag {0} but could not push it; run 'git push origin {0}' later",
                    tag.tag
                ))?,
                None if args.tag && !dry_run => output.warning("Version bumped but not tagged")?,
                None => {}
            }
        }
    }
    Ok(())
}
