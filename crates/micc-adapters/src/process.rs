//! Child-process adapter using `std::process::Command`.

use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{instrument, trace};

use micc_core::application::ApplicationError;
use micc_core::application::ports::{ProcessOutput, ProcessRunner};
use micc_core::error::MiccResult;

/// Runs programs found on `PATH`, capturing their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip(self, args), fields(cwd = %cwd.display()))]
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> MiccResult<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| unavailable(program, &e))?;

        // killed by a signal
        let code = output.status.code().unwrap_or(-1);
        trace!(code, "{program} finished");
        Ok(ProcessOutput {
            code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn unavailable(program: &str, e: &io::Error) -> ApplicationError {
    let reason = match e.kind() {
        io::ErrorKind::NotFound => "program not found (is it installed and on PATH?)".to_owned(),
        _ => e.to_string(),
    };
    ApplicationError::CollaboratorUnavailable {
        program: program.to_owned(),
        reason,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn captures_output_and_code() {
        let dir = TempDir::new().unwrap();
        let out = SystemProcessRunner::new()
            .run("sh", &args(&["-c", "echo out; echo err >&2; exit 3"]), dir.path())
            .unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[test]
    fn runs_in_the_given_directory() {
        let dir = TempDir::new().unwrap();
        let out = SystemProcessRunner::new()
            .run("sh", &args(&["-c", "touch marker"]), dir.path())
            .unwrap();
        assert!(out.success());
        assert!(dir.path().join("marker").is_file());
    }

    #[test]
    fn missing_program_is_unavailable() {
        let err = SystemProcessRunner::new()
            .run("micc-no-such-program", &[], Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("micc-no-such-program"));
    }
}
