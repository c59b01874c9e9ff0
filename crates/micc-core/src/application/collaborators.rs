//! External collaborators: documentation builder, packager, git and the
//! Python interpreter, all run as child processes through [`ProcessRunner`].

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::{ProcessOutput, ProcessRunner};
use crate::error::MiccResult;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    pub program: String,
    pub args: Vec<String>,
}

impl Cmd {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Run `cmds` in `cwd`, relaying captured output to the log.
///
/// Returns the exit code of the first failing command (stopping there when
/// `stop_on_error`), or 0.
pub fn execute(runner: &dyn ProcessRunner, cmds: &[Cmd], cwd: &Path, stop_on_error: bool) -> MiccResult<i32> {
    let mut first_failure = 0;
    for cmd in cmds {
        debug!("> {cmd}");
        let output = runner.run(&cmd.program, &cmd.args, cwd)?;
        relay(cmd, &output);
        if !output.success() {
            if first_failure == 0 {
                first_failure = output.code;
            }
            if stop_on_error {
                break;
            }
        }
    }
    Ok(first_failure)
}

fn relay(cmd: &Cmd, output: &ProcessOutput) {
    if output.success() {
        if !output.stdout.is_empty() {
            debug!(" (stdout)\n{}", output.stdout);
        }
        if !output.stderr.is_empty() {
            debug!(" (stderr)\n{}", output.stderr);
        }
    } else {
        warn!("> {cmd} exited with {}", output.code);
        if !output.stdout.is_empty() {
            warn!(" (stdout)\n{}", output.stdout);
        }
        if !output.stderr.is_empty() {
            warn!(" (stderr)\n{}", output.stderr);
        }
    }
}

/// Run one command; a non-zero exit becomes `CollaboratorFailed`.
fn run_checked(runner: &dyn ProcessRunner, cmd: Cmd, cwd: &Path) -> MiccResult<ProcessOutput> {
    debug!("> {cmd}");
    let output = runner.run(&cmd.program, &cmd.args, cwd)?;
    relay(&cmd, &output);
    if output.success() {
        Ok(output)
    } else {
        Err(ApplicationError::CollaboratorFailed {
            command: cmd.to_string(),
            code: output.code,
        }
        .into())
    }
}

/// `make <format>` in the docs directory; returns the exit code.
#[instrument(skip(runner))]
pub fn build_docs(runner: &dyn ProcessRunner, docs_dir: &Path, format: &str) -> MiccResult<i32> {
    info!("Building documentation ({format})");
    execute(runner, &[Cmd::new("make", [format])], docs_dir, true)
}

/// `poetry version <rule>` in the project directory.
pub fn poetry_version(runner: &dyn ProcessRunner, project: &Path, rule: &str) -> MiccResult<()> {
    run_checked(runner, Cmd::new("poetry", ["version", rule]), project).map(|_| ())
}

/// Name of the git tag for `version`.
pub fn tag_name(version: &str) -> String {
    format!("v{version}")
}

/// `git tag -a v<version> -m "tag version <version>"`.
pub fn git_tag(runner: &dyn ProcessRunner, project: &Path, version: &str) -> MiccResult<()> {
    let tag = tag_name(version);
    let message = format!("tag version {version}");
    run_checked(
        runner,
        Cmd::new("git", ["tag", "-a", tag.as_str(), "-m", message.as_str()]),
        project,
    )
    .map(|_| ())
}

/// `git push origin v<version>`.
pub fn git_push_tag(runner: &dyn ProcessRunner, project: &Path, version: &str) -> MiccResult<()> {
    let tag = tag_name(version);
    run_checked(runner, Cmd::new("git", ["push", "origin", tag.as_str()]), project).map(|_| ())
}

/// Initialise a git repository holding the freshly created project.
///
/// Failures are reported as warnings only.
#[instrument(skip(runner))]
pub fn git_init(runner: &dyn ProcessRunner, project: &Path, project_name: &str, github_username: Option<&str>) {
    info!("Creating git repository");
    let mut cmds = vec![
        Cmd::new("git", ["init"]),
        Cmd::new("git", ["add", "*"]),
        Cmd::new("git", ["add", ".gitignore"]),
        Cmd::new("git", ["commit", "-m", "first commit"]),
    ];
    if let Some(user) = github_username.filter(|u| !u.is_empty()) {
        cmds.push(Cmd::new(
            "git",
            [
                "remote".to_owned(),
                "add".to_owned(),
                "origin".to_owned(),
                format!("https://github.com/{user}/{project_name}"),
            ],
        ));
        cmds.push(Cmd::new("git", ["push", "-u", "origin", "master"]));
    }
    match execute(runner, &cmds, project, false) {
        Ok(0) => {}
        Ok(code) => warn!("git exited with {code} while creating the repository"),
        Err(e) => warn!("Could not create git repository: {e}"),
    }
}

/// Ask the Python interpreter for its site-packages directory.
pub fn site_packages(runner: &dyn ProcessRunner, cwd: &Path) -> MiccResult<String> {
    let output = run_checked(
        runner,
        Cmd::new(
            "python3",
            ["-c", "import site; print(site.getsitepackages()[0])"],
        ),
        cwd,
    )?;
    Ok(output.stdout.trim().to_owned())
}

// ── tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockProcessRunner;
    use crate::error::MiccError;

    fn exit(code: i32) -> MiccResult<ProcessOutput> {
        Ok(ProcessOutput {
            code,
            stdout: "out".into(),
            stderr: String::new(),
        })
    }

    #[test]
    fn docs_runs_make_in_docs_dir() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|program, args, cwd| {
                program == "make" && args == ["html".to_owned()] && cwd == Path::new("/p/docs")
            })
            .times(1)
            .returning(|_, _, _| exit(0));
        assert_eq!(build_docs(&runner, Path::new("/p/docs"), "html").unwrap(), 0);
    }

    #[test]
    fn execute_stops_on_first_error() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().times(1).returning(|_, _, _| exit(2));
        let cmds = [Cmd::new("false", Vec::<String>::new()), Cmd::new("true", Vec::<String>::new())];
        assert_eq!(execute(&runner, &cmds, Path::new("."), true).unwrap(), 2);
    }

    #[test]
    fn execute_can_continue_after_error() {
        let mut runner = MockProcessRunner::new();
        let mut seq = mockall::Sequence::new();
        runner.expect_run().times(1).in_sequence(&mut seq).returning(|_, _, _| exit(3));
        runner.expect_run().times(1).in_sequence(&mut seq).returning(|_, _, _| exit(0));
        let cmds = [Cmd::new("a", Vec::<String>::new()), Cmd::new("b", Vec::<String>::new())];
        assert_eq!(execute(&runner, &cmds, Path::new("."), false).unwrap(), 3);
    }

    #[test]
    fn tag_failure_carries_exit_code() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .withf(|program, _, cwd| program == "git" && cwd == Path::new("/p"))
            .returning(|_, _, _| exit(128));
        let err = git_tag(&runner, Path::new("/p"), "1.0.0").unwrap_err();
        assert!(matches!(
            err,
            MiccError::Application(ApplicationError::CollaboratorFailed { code: 128, .. })
        ));
        assert_eq!(err.exit_code(), 128);
    }

    #[test]
    fn git_init_pushes_only_with_username() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().times(4).returning(|_, _, _| exit(0));
        git_init(&runner, Path::new("/p"), "foo", None);

        let mut runner = MockProcessRunner::new();
        runner.expect_run().times(6).returning(|_, _, _| exit(0));
        git_init(&runner, Path::new("/p"), "foo", Some("ada"));
    }

    #[test]
    fn site_packages_is_trimmed() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|_, _, _| {
            Ok(ProcessOutput {
                code: 0,
                stdout: "/usr/lib/python3/site-packages\n".into(),
                stderr: String::new(),
            })
        });
        assert_eq!(
            site_packages(&runner, Path::new(".")).unwrap(),
            "/usr/lib/python3/site-packages"
        );
    }

    #[test]
    fn command_display() {
        let cmd = Cmd::new("git", ["push", "origin", "v1.0.0"]);
        assert_eq!(cmd.to_string(), "git push origin v1.0.0");
    }
}
