//! Four-part application versions.
//!
//! A [`Version`] is an ordered `major.minor.build.revision` tuple. Ordering is
//! lexicographic over the tuple, so the derived `Ord` is the comparison the
//! resolver relies on.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::UpdateError;

/// A `major.minor.build.revision` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Returns true if `self` is strictly newer than `baseline`.
    pub fn is_newer_than(&self, baseline: &Version) -> bool {
        is_newer(self, baseline)
    }
}

/// Compare two versions component by component; the first difference decides.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.build.cmp(&b.build))
        .then(a.revision.cmp(&b.revision))
}

/// True when `candidate` compares greater than `baseline`.
pub fn is_newer(candidate: &Version, baseline: &Version) -> bool {
    compare(candidate, baseline) == Ordering::Greater
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    /// Parses exactly four dot-separated non-negative integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 4 {
            return Err(UpdateError::invalid_argument(format!(
                "Invalid version '{}'. Expected 'major.minor.build.revision'.",
                s
            )));
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                UpdateError::invalid_argument(format!(
                    "Invalid version component '{}' in '{}'",
                    part, s
                ))
            })?;
        }

        let [major, minor, build, revision] = numbers;
        Ok(Version::new(major, minor, build, revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_compare_major_decides_first() {
        assert_eq!(compare(&v("2.0.0.0"), &v("1.9.9.9")), Ordering::Greater);
        assert_eq!(compare(&v("1.9.9.9"), &v("2.0.0.0")), Ordering::Less);
    }

    #[test]
    fn test_compare_each_component() {
        assert_eq!(compare(&v("1.1.0.0"), &v("1.0.5.5")), Ordering::Greater);
        assert_eq!(compare(&v("1.0.1.0"), &v("1.0.0.9")), Ordering::Greater);
        assert_eq!(compare(&v("1.0.0.1"), &v("1.0.0.0")), Ordering::Greater);
        assert_eq!(compare(&v("1.2.3.4"), &v("1.2.3.4")), Ordering::Equal);
    }

    #[test]
    fn test_compare_is_antisymmetric() {
        let versions = [
            v("0.0.0.0"),
            v("0.0.0.1"),
            v("1.0.0.0"),
            v("1.2.0.0"),
            v("1.2.0.7"),
            v("3.0.1.0"),
        ];
        for a in &versions {
            for b in &versions {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "{} vs {}", a, b);
                // agrees with the derived ordering
                assert_eq!(compare(a, b), a.cmp(b));
            }
        }
    }

    #[test]
    fn test_is_newer_not_reflexive() {
        for s in ["0.0.0.0", "1.2.3.4", "10.0.0.1"] {
            assert!(!is_newer(&v(s), &v(s)));
        }
    }

    #[test]
    fn test_is_newer_than() {
        assert!(v("1.3.0.0").is_newer_than(&v("1.2.0.0")));
        assert!(!v("1.2.0.0").is_newer_than(&v("1.3.0.0")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(1, 2, 0, 7).to_string(), "1.2.0.7");
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(v("1.2.3.4"), Version::new(1, 2, 3, 4));
        assert_eq!(v(" 0.0.0.0 "), Version::default());
    }

    #[test]
    fn test_parse_invalid() {
        assert!("1.2.3".parse::<Version>().is_err());
        assert!("1.2.3.4.5".parse::<Version>().is_err());
        assert!("1.2.x.4".parse::<Version>().is_err());
        assert!("1.-2.3.4".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_parse_error_is_invalid_argument() {
        let err = "v1".parse::<Version>().unwrap_err();
        assert!(matches!(err, UpdateError::InvalidArgument(_)));
    }
}
