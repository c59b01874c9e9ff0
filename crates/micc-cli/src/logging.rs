//! Tracing subscriber initialisation and the project log file.
//!
//! Only the CLI crate installs subscribers; `micc-core` and the adapters only
//! *emit* spans and events.
//!
//! Two layers are registered:
//!
//! 1. the console, on stderr, filtered by verbosity;
//! 2. the project log `P/micc.log`, always at DEBUG. It stays dormant until
//!    a command attaches it through the [`LogSink`] port.
//!
//! # Console verbosity mapping
//!
//! | Flag(s)   | Verbosity | Filter level |
//! |-----------|-----------|--------------|
//! | `--quiet` | 0         | ERROR        |
//! | (none)    | 1         | INFO         |
//! | `-v`      | 2         | DEBUG        |
//! | `-vv`     | 3         | TRACE        |
//!
//! `RUST_LOG` overrides the console filter if set.

use std::fs;
use std::io::{self, IsTerminal as _, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

use micc_core::application::ApplicationError;
use micc_core::application::ports::{LogGuard, LogSink};
use micc_core::error::MiccResult;

use crate::error::ERROR_TARGET;

/// File name of the project log.
pub const LOG_FILE: &str = "micc.log";

/// Crates whose events reach the project log.
const TARGETS: [&str; 3] = ["micc", "micc_core", "micc_adapters"];

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire. Returns the
/// project log, which the command service attaches to the project it works on.
pub fn init_logging(verbosity: u8, no_color: bool) -> anyhow::Result<ProjectLog> {
    let level = derive_level(verbosity);

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives: Vec<String> = TARGETS.iter().map(|t| format!("{t}={level}")).collect();
        directives.push(format!("{ERROR_TARGET}=off"));
        EnvFilter::new(directives.join(","))
    });

    let use_ansi = !no_color && std::io::stderr().is_terminal();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let project_log = ProjectLog::default();
    let file_filter = TARGETS
        .iter()
        .fold(Targets::new(), |targets, t| targets.with_target(*t, Level::DEBUG));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(project_log.clone())
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(project_log)
}

/// Translate the verbosity to a level string.
fn derive_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

// ── project log ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct Slot {
    appender: Option<RollingFileAppender>,
    /// Project of the most recent attachment.
    last: Option<PathBuf>,
}

/// Switchable writer for `P/micc.log`.
///
/// Records are discarded while nothing is attached. Every record is written
/// with a single unbuffered write, so an interrupted run keeps everything up
/// to the last completed record.
#[derive(Clone, Default)]
pub struct ProjectLog {
    slot: Arc<Mutex<Slot>>,
}

impl ProjectLog {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` while a project log is attached.
    pub fn is_attached(&self) -> bool {
        self.lock().appender.is_some()
    }

    /// Attach the log of the last project again, so a command's error lands
    /// next to its progress messages.
    pub fn reattach_last(&self) -> Option<LogGuard> {
        let last = self.lock().last.clone()?;
        self.attach(&last, false).ok()
    }
}

impl LogSink for ProjectLog {
    fn attach(&self, project: &Path, clear: bool) -> MiccResult<LogGuard> {
        let path = project.join(LOG_FILE);
        if clear {
            fs::write(&path, b"").map_err(|e| ApplicationError::Filesystem {
                path: path.clone(),
                reason: format!("Failed to clear log: {e}"),
            })?;
        }
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(project)
            .map_err(|e| ApplicationError::Filesystem {
                path,
                reason: format!("Failed to open log: {e}"),
            })?;

        let previous = {
            let mut slot = self.lock();
            slot.last = Some(project.to_path_buf());
            slot.appender.replace(appender)
        };

        let slot = Arc::clone(&self.slot);
        Ok(LogGuard::new(move || {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(appender) = slot.appender.as_mut() {
                let _ = appender.flush();
            }
            slot.appender = previous;
        }))
    }
}

/// Writer handed out per record by [`ProjectLog`].
pub struct ProjectLogWriter {
    slot: Arc<Mutex<Slot>>,
}

impl Write for ProjectLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.appender.as_mut() {
            Some(appender) => {
                appender.write_all(buf)?;
                appender.flush()?;
                Ok(buf.len())
            }
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.appender.as_mut() {
            Some(appender) => appender.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for ProjectLog {
    type Writer = ProjectLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProjectLogWriter {
            slot: Arc::clone(&self.slot),
        }
    }
}
