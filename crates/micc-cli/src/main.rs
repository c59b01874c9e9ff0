//! # micc CLI
//!
//! Scaffolding and lifecycle management for Python projects.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Initialise the tracing subscriber (console and project log).
//! 3. Load the user preferences.
//! 4. Wire the adapters into a [`CommandService`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code  | Meaning                                                  |
//! |-------|----------------------------------------------------------|
//! |  0    | Success                                                  |
//! |  1    | Bad arguments, failed precondition, fatal error          |
//! |  3    | Existing file not overwritten (use --overwrite/--backup) |
//! |  4    | Template hook failed                                     |
//! |  5    | Template parameter without value                         |
//! |  6    | Template not found                                       |
//! | other | Exit code of a failing external command                  |

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, instrument};

use micc_adapters::{LocalFilesystem, SystemProcessRunner, TemplateLibrary, TomlManifestStore};
use micc_core::application::{CommandService, GlobalOptions};

use crate::{
    cli::{Cli, Commands},
    commands::Session,
    config::Preferences,
    error::{CliError, CliResult, IntoCli as _},
    logging::{ProjectLog, init_logging},
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
#[cfg(feature = "interactive")]
mod prompt;

fn main() -> ExitCode {
    // Load .env before anything else, including tracing init.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported as "errors" on stdout.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    let verbosity = cli.global.verbosity();

    // ── 2. Initialise tracing ─────────────────────────────────────────────
    let project_log = match init_logging(verbosity, cli.global.no_color) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e}");
            return ExitCode::from(1);
        }
    };

    debug!(
        verbosity,
        project_path = %cli.global.project_path.display(),
        clear_log = cli.global.clear_log,
        "CLI started"
    );

    // ── 3. Load preferences ───────────────────────────────────────────────
    let preferences = match Preferences::load().with_cli_context(|| "loading user preferences") {
        Ok(prefs) => prefs,
        Err(e) => return handle_error(e, verbosity, &project_log),
    };
    if let Some(source) = &preferences.source {
        debug!("Using preferences from {}", source.display());
    }

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global);

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, preferences, project_log.clone(), output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => handle_error(e, verbosity, &project_log),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, preferences: Preferences, log: ProjectLog, output: OutputManager) -> CliResult<()> {
    let mut options = GlobalOptions::new(cli.global.project_path.clone()).with_parameters(preferences.parameters);
    options.verbosity = cli.global.verbosity();
    options.clear_log = cli.global.clear_log;

    let session = Session {
        service: build_service(log),
        options,
        output,
    };

    match cli.command {
        Commands::Create(args) => commands::create::execute(args, session),
        Commands::Add(args) => commands::add::execute(args, session),
        Commands::Version(args) => commands::version::execute(args, session),
        Commands::Tag => commands::tag::execute(session),
        Commands::ConvertToPackage(args) => commands::convert::execute(args, session),
        Commands::Docs(args) => commands::docs::execute(args, session),
        Commands::Info(args) => commands::info::execute(args, session),
        Commands::DevInstall(args) => commands::dev_install::install(args, session),
        Commands::DevUninstall(args) => commands::dev_install::uninstall(args, session),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Wire the adapters into the command service.
fn build_service(log: ProjectLog) -> CommandService {
    let templates = TemplateLibrary::discover();
    match templates.dir() {
        Some(dir) => debug!("Template library: {}", dir.display()),
        None => info!("No template library found; only template paths can be used"),
    }
    let service = CommandService::new(
        Arc::new(LocalFilesystem::new()),
        Arc::new(TomlManifestStore::new()),
        Arc::new(templates),
        Arc::new(SystemProcessRunner::new()),
        Arc::new(log),
    );
    with_prompter(service)
}

#[cfg(feature = "interactive")]
fn with_prompter(service: CommandService) -> CommandService {
    use std::io::IsTerminal as _;

    if std::io::stdin().is_terminal() {
        service.with_prompter(Arc::new(prompt::DialoguerPrompter::new()))
    } else {
        service
    }
}

#[cfg(not(feature = "interactive"))]
fn with_prompter(service: CommandService) -> CommandService {
    service
}

/// Translate a `CliError` into a user message and an appropriate exit code.
///
/// The error is also recorded in the log of the project the command worked
/// on, when it got as far as opening one.
fn handle_error(err: CliError, verbosity: u8, log: &ProjectLog) -> ExitCode {
    {
        let _guard = if log.is_attached() { None } else { log.reattach_last() };
        err.log();
    }

    let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        err.format_colored(verbosity)
    } else {
        err.format_plain(verbosity)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
