//! Dependency version ranges.
//!
//! Supports the interval notation used in `project.json` dependency
//! entries:
//!
//! | Expression        | Meaning                          |
//! |-------------------|----------------------------------|
//! | `1.0.0`           | `>= 1.0.0`                       |
//! | `[1.0.0]`         | exactly `1.0.0`                  |
//! | `[1.0.0, 2.0.0)`  | `>= 1.0.0, < 2.0.0`              |
//! | `(, 2.0.0]`       | `<= 2.0.0`                       |
//! | `1.0.0-*`         | `>= 1.0.0`, prereleases included |
//! | `1.*`, `1.2.*`    | floating minor / patch           |
//! | `*`               | any version                      |
//!
//! Resolution semantics beyond containment belong to the dependency
//! resolver; [`VersionRange::to_range`] hands it a PubGrub range.

use std::fmt;
use std::str::FromStr;

use pubgrub::Range;
use semver::{Prerelease, Version};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::version::parse_version_lenient;

/// Error parsing a version range expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionRangeError {
    #[error("version range is empty")]
    Empty,

    #[error("`{0}` is not a valid version")]
    InvalidVersion(String),

    #[error("unbalanced brackets")]
    UnbalancedBrackets,

    #[error("an interval needs exactly one `,` separator")]
    BadSeparator,

    #[error("an interval needs at least one bound")]
    NoBounds,

    #[error("exact versions must use `[x]`")]
    BadExact,

    #[error("lower bound {min} is above upper bound {max}")]
    Inverted { min: Version, max: Version },
}

/// Floating behavior of a range written with a `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatBehavior {
    #[default]
    None,
    /// `1.0.0-*`
    Prerelease,
    /// `1.2.*`
    Patch,
    /// `1.*`
    Minor,
    /// `*`
    Major,
}

/// A parsed version range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<Version>,
    min_inclusive: bool,
    max: Option<Version>,
    max_inclusive: bool,
    float: FloatBehavior,
}

impl VersionRange {
    /// `>= version`
    pub fn at_least(version: Version) -> Self {
        VersionRange {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
            float: FloatBehavior::None,
        }
    }

    /// Exactly `version`.
    pub fn exact(version: Version) -> Self {
        VersionRange {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
            float: FloatBehavior::None,
        }
    }

    /// Parse a range expression.
    pub fn parse(s: &str) -> Result<Self, VersionRangeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionRangeError::Empty);
        }

        if s.starts_with(['[', '(']) || s.ends_with([']', ')']) {
            return Self::parse_interval(s);
        }

        Self::parse_simple(s)
    }

    fn parse_simple(s: &str) -> Result<Self, VersionRangeError> {
        if s == "*" {
            return Ok(VersionRange {
                float: FloatBehavior::Major,
                ..Self::at_least(Version::new(0, 0, 0))
            });
        }

        if let Some(base) = s.strip_suffix("-*") {
            let version = parse_bound(base)?;
            return Ok(VersionRange {
                float: FloatBehavior::Prerelease,
                ..Self::at_least(version)
            });
        }

        if let Some(base) = s.strip_suffix(".*") {
            let parts: Vec<&str> = base.split('.').collect();
            let float = match parts.len() {
                1 => FloatBehavior::Minor,
                2 => FloatBehavior::Patch,
                _ => return Err(VersionRangeError::InvalidVersion(s.to_string())),
            };
            let version = parse_bound(base)?;
            if !version.pre.is_empty() {
                return Err(VersionRangeError::InvalidVersion(s.to_string()));
            }
            return Ok(VersionRange {
                float,
                ..Self::at_least(version)
            });
        }

        Ok(Self::at_least(parse_bound(s)?))
    }

    fn parse_interval(s: &str) -> Result<Self, VersionRangeError> {
        let min_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(VersionRangeError::UnbalancedBrackets),
        };
        let max_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(VersionRangeError::UnbalancedBrackets),
        };
        if s.len() < 2 {
            return Err(VersionRangeError::UnbalancedBrackets);
        }

        let inner = s[1..s.len() - 1].trim();
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

        match parts.as_slice() {
            [single] => {
                if !min_inclusive || !max_inclusive || single.is_empty() {
                    return Err(VersionRangeError::BadExact);
                }
                Ok(Self::exact(parse_bound(single)?))
            }
            [lower, upper] => {
                if lower.is_empty() && upper.is_empty() {
                    return Err(VersionRangeError::NoBounds);
                }
                let min = if lower.is_empty() {
                    None
                } else {
                    Some(parse_bound(lower)?)
                };
                let max = if upper.is_empty() {
                    None
                } else {
                    Some(parse_bound(upper)?)
                };

                if let (Some(min), Some(max)) = (&min, &max) {
                    let empty = min > max || (min == max && !(min_inclusive && max_inclusive));
                    if empty {
                        return Err(VersionRangeError::Inverted {
                            min: min.clone(),
                            max: max.clone(),
                        });
                    }
                }

                Ok(VersionRange {
                    min_inclusive: min.is_some() && min_inclusive,
                    max_inclusive: max.is_some() && max_inclusive,
                    min,
                    max,
                    float: FloatBehavior::None,
                })
            }
            _ => Err(VersionRangeError::BadSeparator),
        }
    }

    pub fn min_version(&self) -> Option<&Version> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    pub fn float_behavior(&self) -> FloatBehavior {
        self.float
    }

    fn is_exact(&self) -> bool {
        self.min.is_some() && self.min == self.max && self.min_inclusive && self.max_inclusive
    }

    /// Check whether `version` falls inside this range.
    pub fn satisfies(&self, version: &Version) -> bool {
        self.to_range().contains(version)
    }

    /// Convert to a PubGrub range for the dependency resolver.
    pub fn to_range(&self) -> Range<Version> {
        let lower = match &self.min {
            None => Range::full(),
            Some(min) => {
                let mut min = min.clone();
                // Floating prereleases start at the lowest prerelease of the base version
                if self.float == FloatBehavior::Prerelease && min.pre.is_empty() {
                    min.pre = Prerelease::new("0").unwrap_or_default();
                }
                if self.min_inclusive {
                    Range::higher_than(min)
                } else {
                    Range::strictly_higher_than(min)
                }
            }
        };

        let upper = match &self.max {
            None => Range::full(),
            Some(max) if self.max_inclusive => Range::lower_than(max.clone()),
            Some(max) => Range::strictly_lower_than(max.clone()),
        };

        lower.intersection(&upper)
    }
}

fn parse_bound(s: &str) -> Result<Version, VersionRangeError> {
    parse_version_lenient(s.trim()).ok_or_else(|| VersionRangeError::InvalidVersion(s.to_string()))
}

impl FromStr for VersionRange {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(min) = &self.min {
            match self.float {
                FloatBehavior::Major => return write!(f, "*"),
                FloatBehavior::Minor => return write!(f, "{}.*", min.major),
                FloatBehavior::Patch => return write!(f, "{}.{}.*", min.major, min.minor),
                FloatBehavior::Prerelease => return write!(f, "{}-*", min),
                FloatBehavior::None => {}
            }

            if self.is_exact() {
                return write!(f, "[{}]", min);
            }
            if self.min_inclusive && self.max.is_none() {
                return write!(f, "{}", min);
            }
        }

        write!(f, "{}", if self.min_inclusive { '[' } else { '(' })?;
        if let Some(min) = &self.min {
            write!(f, "{}", min)?;
        }
        write!(f, ", ")?;
        if let Some(max) = &self.max {
            write!(f, "{}", max)?;
        }
        write!(f, "{}", if self.max_inclusive { ']' } else { ')' })
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_plain_version_is_minimum() {
        let range = VersionRange::parse("1.0.0").unwrap();
        assert!(range.satisfies(&v("1.0.0")));
        assert!(range.satisfies(&v("1.5.0")));
        assert!(range.satisfies(&v("10.0.0")));
        assert!(!range.satisfies(&v("0.9.9")));
        assert!(!range.satisfies(&v("1.0.0-beta")));
        assert_eq!(range.to_string(), "1.0.0");
    }

    #[test]
    fn test_exact_version() {
        let range = VersionRange::parse("[1.2.3]").unwrap();
        assert!(range.satisfies(&v("1.2.3")));
        assert!(!range.satisfies(&v("1.2.4")));
        assert_eq!(range.to_string(), "[1.2.3]");
    }

    #[test]
    fn test_half_open_interval() {
        let range = VersionRange::parse("[1.0, 2.0)").unwrap();
        assert!(range.satisfies(&v("1.0.0")));
        assert!(range.satisfies(&v("1.9.9")));
        assert!(!range.satisfies(&v("2.0.0")));
        assert_eq!(range.to_string(), "[1.0.0, 2.0.0)");
    }

    #[test]
    fn test_unbounded_lower() {
        let range = VersionRange::parse("(, 2.0.0]").unwrap();
        assert!(range.min_version().is_none());
        assert!(range.satisfies(&v("0.1.0")));
        assert!(range.satisfies(&v("2.0.0")));
        assert!(!range.satisfies(&v("2.0.1")));
        assert_eq!(range.to_string(), "(, 2.0.0]");
    }

    #[test]
    fn test_exclusive_lower_unbounded_upper() {
        let range = VersionRange::parse("(1.0.0,)").unwrap();
        assert!(!range.satisfies(&v("1.0.0")));
        assert!(range.satisfies(&v("1.0.1")));
        assert_eq!(range.to_string(), "(1.0.0, )");
    }

    #[test]
    fn test_floating_prerelease() {
        let range = VersionRange::parse("1.0.0-*").unwrap();
        assert_eq!(range.float_behavior(), FloatBehavior::Prerelease);
        assert!(range.satisfies(&v("1.0.0-alpha")));
        assert!(range.satisfies(&v("1.0.0")));
        assert!(!range.satisfies(&v("0.9.0")));
        assert_eq!(range.to_string(), "1.0.0-*");
    }

    #[test]
    fn test_floating_numbers() {
        assert_eq!(VersionRange::parse("*").unwrap().to_string(), "*");
        assert_eq!(VersionRange::parse("1.*").unwrap().to_string(), "1.*");
        assert_eq!(VersionRange::parse("1.2.*").unwrap().to_string(), "1.2.*");
        assert!(VersionRange::parse("1.2.*").unwrap().satisfies(&v("1.2.7")));
    }

    #[test]
    fn test_display_reparses_to_equal_range() {
        for expr in [
            "1.0.0",
            "[1.0.0]",
            "[1.0.0, 2.0.0)",
            "(1.0.0, 2.0.0]",
            "(, 3.0.0)",
            "[2.0.0, )",
            "1.0.0-*",
            "1.*",
            "*",
        ] {
            let range = VersionRange::parse(expr).unwrap();
            let again = VersionRange::parse(&range.to_string()).unwrap();
            assert_eq!(range, again, "round trip of {expr}");
        }
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(VersionRange::parse("  "), Err(VersionRangeError::Empty));
        assert!(matches!(
            VersionRange::parse("abc"),
            Err(VersionRangeError::InvalidVersion(_))
        ));
        assert_eq!(VersionRange::parse("[1.0"), Err(VersionRangeError::UnbalancedBrackets));
        assert_eq!(VersionRange::parse("[,]"), Err(VersionRangeError::NoBounds));
        assert_eq!(VersionRange::parse("(1.0.0)"), Err(VersionRangeError::BadExact));
        assert_eq!(VersionRange::parse("[1,2,3]"), Err(VersionRangeError::BadSeparator));
        assert!(matches!(
            VersionRange::parse("[2.0, 1.0]"),
            Err(VersionRangeError::Inverted { .. })
        ));
    }
}
