//! Global arguments that apply to every subcommand.
//!
//! Declared here and flattened into [`super::Cli`]. `-v` and `-q` are
//! accepted before or after the subcommand; `-p/--project-path` only before
//! it, because several subcommands use `-p` for their own flags
//! (`create -p`, `version -p`).

use std::path::PathBuf;

use clap::Args;
use clap::builder::FalseyValueParser;

/// Global arguments for all commands.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity.
    ///
    /// The default verbosity is 1 (progress messages). Each `-v` adds one.
    #[arg(
        short = 'v',
        long = "verbosity",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv)",
        long_help = "Increase logging verbosity:
    (none)  - Progress messages
    -v      - Debug level, structure and source file in 'info'
    -vv     - Trace level, error chains, artifacts in 'info'"
    )]
    pub verbose: u8,

    /// Only report errors.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// The project directory (or, for `create`, the directory to create).
    #[arg(
        short = 'p',
        long = "project-path",
        value_name = "DIR",
        default_value = ".",
        help = "Path to the project directory"
    )]
    pub project_path: PathBuf,

    /// Truncate `micc.log` before this command writes to it.
    #[arg(long = "clear-log", global = true, help = "Clear the project log file first")]
    pub clear_log: bool,

    /// Disable ANSI colour codes.
    ///
    /// Automatically honoured when `NO_COLOR` is set in the environment
    /// (see <https://no-color.org>).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new(),
        help = "Disable colored output"
    )]
    pub no_color: bool,
}

impl GlobalArgs {
    /// Effective verbosity: 0 when quiet, otherwise 1 plus the `-v` count.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            project_path: PathBuf::from("."),
            clear_log: false,
            no_color: true,
        }
    }

    #[test]
    fn default_verbosity_is_one() {
        assert_eq!(args(0, false).verbosity(), 1);
    }

    #[test]
    fn each_flag_adds_one() {
        assert_eq!(args(2, false).verbosity(), 3);
    }

    #[test]
    fn quiet_is_zero() {
        assert_eq!(args(0, true).verbosity(), 0);
    }

    #[test]
    fn no_color_flag_sets_true() {
        use clap::Parser as _;
        let cli = crate::cli::Cli::try_parse_from(["micc", "--no-color", "info"]).unwrap();
        assert!(cli.global.no_color);
    }
}
