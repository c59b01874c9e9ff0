//! Unified error handling for micc core.
//!
//! [`MiccError`] wraps domain and application errors and knows which
//! [`ErrorCategory`] (and therefore which process exit code) each failure
//! belongs to.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for micc core operations.
#[derive(Debug, Error, Clone)]
pub enum MiccError {
    /// Errors from the domain layer (rule violations in pure logic).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (preconditions, templates, I/O).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl MiccError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in micc".into()],
        }
    }

    /// Get error category for display and exit-code purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Fatal,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// `true` when at least one file was left untouched under the `skip` policy.
    pub fn is_collision(&self) -> bool {
        self.category() == ErrorCategory::Collision
    }
}

/// Error categories, one per row of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Ambiguous or conflicting flags, unknown rule, invalid name.
    UserInput,
    /// The project is not in the state the command requires.
    Precondition,
    /// The template engine failed with the given return code.
    Template(ReturnCode),
    /// A file would have been overwritten under the `skip` policy.
    Collision,
    /// An external process exited non-zero.
    Collaborator(i32),
    /// I/O failure, corrupted manifest, bug.
    Fatal,
}

impl ErrorCategory {
    /// Exit code reported to the operating system.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::UserInput | Self::Precondition | Self::Fatal => ReturnCode::UserError.code(),
            Self::Template(code) => code.code(),
            Self::Collision => ReturnCode::OverwriteRefused.code(),
            // Exit statuses are 8-bit; anything outside 1..=255 still has to fail.
            Self::Collaborator(code) => match u8::try_from(code) {
                Ok(0) | Err(_) => ReturnCode::UserError.code(),
                Ok(code) => code,
            },
        }
    }
}

/// Numeric return codes shared by the template engine and the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReturnCode {
    Ok = 0,
    UserError = 1,
    OverwriteRefused = 3,
    HookFailed = 4,
    UnresolvedParameter = 5,
    TemplateMissing = 6,
}

impl ReturnCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Convenient result type alias.
pub type MiccResult<T> = Result<T, MiccError>;
