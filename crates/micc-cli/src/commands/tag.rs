//! Implementation of the `micc tag` command.

use super::Session;
use crate::error::CliResult;

pub fn execute(session: Session) -> CliResult<()> {
    let outcome = session.service.tag(&session.options)?;
    if outcome.pushed {
        session.output.success(&format!("Created and pushed tag {}", outcome.tag))?;
    } else {
        session.output.warning(&format!(
            "Created tag {0} but could not push it; run 'git push origin {0}' later",
            outcome.tag
        ))?;
    }
    Ok(())
}
