//! Per-file collision handling for template expansion.
//!
//! ```text
//! initial ──file absent──────▶ WRITE
//! initial ──equal────────────▶ SKIP_EQUAL
//! initial ──differ, skip─────▶ REFUSE
//! initial ──differ, backup───▶ BACKUP → WRITE
//! initial ──differ, overwrite▶ WRITE
//! ```

use std::fmt;

/// What to do when a rendered file already exists with different content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Leave the existing file alone and report it.
    #[default]
    Skip,
    /// Copy the existing file to `<file>.bak`, then write.
    Backup,
    /// Write without keeping the old content.
    Overwrite,
}

impl CollisionPolicy {
    /// Policy selected by the `--overwrite` / `--backup` flags.
    ///
    /// `--backup` wins when both are given.
    pub fn from_flags(overwrite: bool, backup: bool) -> Self {
        match (overwrite, backup) {
            (_, true) => Self::Backup,
            (true, false) => Self::Overwrite,
            (false, false) => Self::Skip,
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Backup => write!(f, "backup"),
            Self::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Outcome of the merge state machine for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    Write,
    SkipEqual,
    Refuse,
    BackupThenWrite,
}

/// Decide how to merge `rendered` into a destination whose current content is
/// `existing` (`None` when the file is absent).
pub fn decide(existing: Option<&[u8]>, rendered: &[u8], policy: CollisionPolicy) -> MergeDecision {
    match existing {
        None => MergeDecision::Write,
        Some(current) if current == rendered => MergeDecision::SkipEqual,
        Some(_) => match policy {
            CollisionPolicy::Skip => MergeDecision::Refuse,
            CollisionPolicy::Backup => MergeDecision::BackupThenWrite,
            CollisionPolicy::Overwrite => MergeDecision::Write,
        },
    }
}

/// Name of the backup file for `file_name`.
pub fn backup_name(file_name: &str) -> String {
    format!("{file_name}.bak")
}
