//! Semantic version parsing and bump rules.
//!
//! Versions are [`semver::Version`]s. Pre-release bumps follow the usual
//! lattice: `premajor`/`preminor`/`prepatch` move to the next release and
//! start a fresh `alpha.0` pre-release, `prerelease` increments the trailing
//! numeric identifier (or starts one), and `major`/`minor`/`patch` on a
//! pre-release first release the version they are a pre-release of.

use std::fmt;
use std::str::FromStr;

use semver::{Prerelease, Version};

use super::DomainError;

const FIRST_PRERELEASE: &str = "alpha.0";

/// How to compute the next version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpRule {
    Major,
    Minor,
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
    /// Use this version verbatim.
    Exact(Version),
}

impl FromStr for BumpRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "major" => Self::Major,
            "minor" => Self::Minor,
            "patch" => Self::Patch,
            "premajor" => Self::Premajor,
            "preminor" => Self::Preminor,
            "prepatch" => Self::Prepatch,
            "prerelease" => Self::Prerelease,
            other => Self::Exact(Version::parse(other.trim_start_matches('v')).map_err(|e| {
                DomainError::InvalidVersion {
                    version: other.to_owned(),
                    reason: e.to_string(),
                }
            })?),
        })
    }
}

impl fmt::Display for BumpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Premajor => write!(f, "premajor"),
            Self::Preminor => write!(f, "preminor"),
            Self::Prepatch => write!(f, "prepatch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Combine the positional rule and the `--major/--minor/--patch` flags.
///
/// Returns `Ok(None)` when no bump was requested.
pub fn select_rule(
    rule: Option<&str>,
    major: bool,
    minor: bool,
    patch: bool,
) -> Result<Option<BumpRule>, DomainError> {
    let rule = rule.map(str::trim).filter(|r| !r.is_empty());
    match (rule, major, minor, patch) {
        (Some(rule), true, _, _) | (Some(rule), _, true, _) | (Some(rule), _, _, true) => {
            Err(DomainError::AmbiguousArgs { rule: rule.into() })
        }
        (Some(rule), ..) => rule.parse().map(Some),
        (None, true, _, _) => Ok(Some(BumpRule::Major)),
        (None, _, true, _) => Ok(Some(BumpRule::Minor)),
        (None, _, _, true) => Ok(Some(BumpRule::Patch)),
        (None, false, false, false) => Ok(None),
    }
}

/// Parse a version as found in project files.
///
/// Accepts a leading `v` and missing minor/patch components (`7.0` → `7.0.0`).
pub fn parse_version(s: &str) -> Result<Version, DomainError> {
    let trimmed = s.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(trimmed) {
        return Ok(v);
    }

    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(i) => trimmed.split_at(i),
        None => (trimmed, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid(s, "expected MAJOR[.MINOR[.PATCH]]"));
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(rest);
    Version::parse(&padded).map_err(|e| invalid(s, &e.to_string()))
}

/// Compute the version that follows `current` under `rule`.
pub fn bump(current: &Version, rule: &BumpRule) -> Version {
    let is_pre = !current.pre.is_empty();
    match rule {
        BumpRule::Major => {
            if is_pre && current.minor == 0 && current.patch == 0 {
                release(current)
            } else {
                Version::new(current.major + 1, 0, 0)
            }
        }
        BumpRule::Minor => {
            if is_pre && current.patch == 0 {
                release(current)
            } else {
                Version::new(current.major, current.minor + 1, 0)
            }
        }
        BumpRule::Patch => {
            if is_pre {
                release(current)
            } else {
                Version::new(current.major, current.minor, current.patch + 1)
            }
        }
        BumpRule::Premajor => with_pre(Version::new(current.major + 1, 0, 0), FIRST_PRERELEASE),
        BumpRule::Preminor => {
            with_pre(Version::new(current.major, current.minor + 1, 0), FIRST_PRERELEASE)
        }
        BumpRule::Prepatch => with_pre(
            Version::new(current.major, current.minor, current.patch + 1),
            FIRST_PRERELEASE,
        ),
        BumpRule::Prerelease => {
            if is_pre {
                with_pre(release(current), &next_prerelease(current.pre.as_str()))
            } else {
                bump(current, &BumpRule::Prepatch)
            }
        }
        BumpRule::Exact(v) => v.clone(),
    }
}

fn release(v: &Version) -> Version {
    Version::new(v.major, v.minor, v.patch)
}

fn with_pre(mut v: Version, pre: &str) -> Version {
    // Identifiers built here are always valid; fall back to an empty tag otherwise.
    v.pre = Prerelease::new(pre).unwrap_or(Prerelease::EMPTY);
    v
}

fn next_prerelease(pre: &str) -> String {
    let mut ids: Vec<String> = pre.split('.').map(str::to_owned).collect();
    match ids.last().and_then(|last| last.parse::<u64>().ok()) {
        Some(n) => {
            let last = ids.len() - 1;
            ids[last] = (n + 1).to_string();
        }
        None => ids.push("0".into()),
    }
    ids.join(".")
}

fn invalid(version: &str, reason: &str) -> DomainError {
    DomainError::InvalidVersion {
        version: version.into(),
        reason: reason.into(),
    }
}
