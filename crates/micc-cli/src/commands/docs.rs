//! Implementation of the `micc docs` command.

use super::Session;
use crate::cli::DocsArgs;
use crate::error::CliResult;

pub fn execute(args: DocsArgs, session: Session) -> CliResult<()> {
    let formats = args.formats();
    session.service.docs(&session.options, &formats)?;
    session
        .output
        .success(&format!("Documentation built ({})", formats.join(", ")))?;
    Ok(())
}
