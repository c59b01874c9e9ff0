//! Dependency constraint parsing (`^1.2.3`, `>=1.0`, `==2.0.0`, ...).

use std::fmt;
use std::ops::Bound;

use semver::Version;

use super::{DomainError, version::parse_version};

/// A half-open or closed interval of versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Bound<Version>,
    pub upper: Bound<Version>,
}

impl VersionRange {
    /// `true` if `v` lies inside the range.
    pub fn contains(&self, v: &Version) -> bool {
        let above = match &self.lower {
            Bound::Included(lo) => v >= lo,
            Bound::Excluded(lo) => v > lo,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(hi) => v <= hi,
            Bound::Excluded(hi) => v < hi,
            Bound::Unbounded => true,
        };
        above && below
    }

    /// The smallest version named by the constraint, if it has one.
    pub fn lower_version(&self) -> Option<&Version> {
        match &self.lower {
            Bound::Included(v) | Bound::Excluded(v) => Some(v),
            Bound::Unbounded => None,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(v) => write!(f, "[{v}, ")?,
            Bound::Excluded(v) => write!(f, "({v}, ")?,
            Bound::Unbounded => write!(f, "(-inf, ")?,
        }
        match &self.upper {
            Bound::Included(v) => write!(f, "{v}]"),
            Bound::Excluded(v) => write!(f, "{v})"),
            Bound::Unbounded => write!(f, "inf)"),
        }
    }
}

/// Parse a single constraint of the forms `==V`, `>=V`, `>V`, `<=V`, `<V`,
/// `^V`, a bare `V` (exact) or `*`.
pub fn version_range(spec: &str) -> Result<VersionRange, DomainError> {
    let spec = spec.trim();
    if spec == "*" {
        return Ok(VersionRange {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        });
    }

    let operators = ["==", ">=", "<=", ">", "<", "^"];
    let (op, rest) = operators
        .iter()
        .find_map(|op| spec.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("==", spec));

    let v = parse_version(rest).map_err(|_| DomainError::InvalidConstraint { spec: spec.into() })?;

    let range = match op {
        "==" => VersionRange {
            lower: Bound::Included(v.clone()),
            upper: Bound::Included(v),
        },
        ">=" => VersionRange {
            lower: Bound::Included(v),
            upper: Bound::Unbounded,
        },
        ">" => VersionRange {
            lower: Bound::Excluded(v),
            upper: Bound::Unbounded,
        },
        "<=" => VersionRange {
            lower: Bound::Unbounded,
            upper: Bound::Included(v),
        },
        "<" => VersionRange {
            lower: Bound::Unbounded,
            upper: Bound::Excluded(v),
        },
        _ => {
            let next_major = Version::new(v.major + 1, 0, 0);
            VersionRange {
                lower: Bound::Included(v),
                upper: Bound::Excluded(next_major),
            }
        }
    };
    Ok(range)
}

/// Rewrite a caret constraint `^V` as `>=V,<nextMajor`; other specs are
/// returned unchanged.
pub fn convert_caret_specification(spec: &str) -> Result<String, DomainError> {
    let Some(rest) = spec.trim().strip_prefix('^') else {
        return Ok(spec.to_owned());
    };
    let v = parse_version(rest).map_err(|_| DomainError::InvalidConstraint { spec: spec.into() })?;
    Ok(format!(">={v},<{}", v.major + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn caret_range() {
        let r = version_range("^1.2.3").unwrap();
        assert_eq!(r.lower, Bound::Included(v("1.2.3")));
        assert_eq!(r.upper, Bound::Excluded(v("2.0.0")));
        assert_eq!(r.to_string(), "[1.2.3, 2.0.0)");
    }

    #[test]
    fn open_ranges() {
        assert_eq!(version_range(">=1.2.3").unwrap().to_string(), "[1.2.3, inf)");
        assert_eq!(version_range(">1.2.3").unwrap().to_string(), "(1.2.3, inf)");
        assert_eq!(version_range("<1.2.3").unwrap().to_string(), "(-inf, 1.2.3)");
        assert_eq!(version_range("<=1.2.3").unwrap().to_string(), "(-inf, 1.2.3]");
    }

    #[test]
    fn exact_and_short_versions() {
        let r = version_range("==2.0").unwrap();
        assert!(r.contains(&v("2.0.0")));
        assert!(!r.contains(&v("2.0.1")));
        assert_eq!(version_range("7.0").unwrap(), r_exact("7.0.0"));
    }

    fn r_exact(s: &str) -> VersionRange {
        VersionRange {
            lower: Bound::Included(v(s)),
            upper: Bound::Included(v(s)),
        }
    }

    #[test]
    fn contains_respects_exclusive_bounds() {
        let r = version_range("^7.0").unwrap();
        assert!(r.contains(&v("7.0.0")));
        assert!(r.contains(&v("7.9.9")));
        assert!(!r.contains(&v("8.0.0")));
        assert_eq!(r.lower_version(), Some(&v("7.0.0")));
    }

    #[test]
    fn wildcard_is_unbounded() {
        let r = version_range("*").unwrap();
        assert!(r.contains(&v("0.0.1")));
        assert_eq!(r.lower_version(), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(version_range(">=banana").is_err());
    }

    #[test]
    fn caret_conversion() {
        assert_eq!(convert_caret_specification("^1.2.3").unwrap(), ">=1.2.3,<2");
        assert_eq!(convert_caret_specification(">=1.0").unwrap(), ">=1.0");
    }
}
