//! Error handling for the micc CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use micc_core::error::{ErrorCategory, MiccError};

/// Target of the events recording a failed command. Written to the project
/// log only; the console shows the formatted error instead.
pub const ERROR_TARGET: &str = "micc::error";

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `micc-core` or the adapters.
    #[error(transparent)]
    Core(#[from] MiccError),

    // ── Config errors ──────────────────────────────────────────────────────
    /// The user preferences file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation of the CLI itself failed (writing to the terminal).
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),
            Self::ConfigError { .. } => vec![
                "Check the JSON syntax of your micc.json preferences file".into(),
                "Values must be strings or objects with a \"default\" key".into(),
            ],
            Self::IoError { .. } => vec!["Check that the terminal or pipe is still open".into()],
        }
    }

    /// Category of the underlying failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => core.category(),
            Self::ConfigError { .. } => ErrorCategory::UserInput,
            Self::IoError { .. } => ErrorCategory::Fatal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category               | Code                    |
    /// |------------------------|-------------------------|
    /// | User input             |  1                      |
    /// | Precondition           |  1                      |
    /// | Fatal                  |  1                      |
    /// | Collision              |  3                      |
    /// | Template               |  4, 5 or 6              |
    /// | Collaborator           |  the child's exit code  |
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// Format the error for display with colors and suggestions.
    ///
    /// With `verbosity >= 2` the chain of causes and the debug
    /// representation are included.
    pub fn format_colored(&self, verbosity: u8) -> String {
        let verbose = verbosity >= 2;
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
            output.push_str(&format!("\n  {}\n", format!("{self:?}").dimmed()));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        if !verbose && self.category() == ErrorCategory::Fatal {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbosity for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbosity: u8) -> String {
        let verbose = verbosity >= 2;
        let mut out = String::new();
        out.push_str(&format!("\nError: {}\n", self));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
            out.push_str(&format!("  {self:?}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose && self.category() == ErrorCategory::Fatal {
            out.push_str("\nUse -v / --verbosity for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserInput | ErrorCategory::Precondition => {
                tracing::error!(target: ERROR_TARGET, "User error: {}", self)
            }
            ErrorCategory::Collision => tracing::error!(target: ERROR_TARGET, "Overwrite refused: {}", self),
            ErrorCategory::Template(code) => {
                tracing::error!(target: ERROR_TARGET, "Template error ({}): {}", code.code(), self)
            }
            ErrorCategory::Collaborator(code) => {
                tracing::error!(target: ERROR_TARGET, "External command failed ({code}): {}", self)
            }
            ErrorCategory::Fatal => tracing::error!(target: ERROR_TARGET, "Fatal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!(target: ERROR_TARGET, "Caused by: {}", source);
        }
    }
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for anyhow::Result<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: format!("{}: {e:#}", f().into()),
            source: Some(e.into()),
        })
    }
}
