/// Semantic version parsing and comparison
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::UpdateError;

/// `major.minor.patch` with an optional pre-release tag.
///
/// Ordered by semver precedence: a tagged version sorts before the untagged
/// one with the same numbers, and tags compare identifier by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
}

impl Version {
    /// Accepts an optional `v` prefix, e.g. `v5.1.0-beta.2`.
    pub fn parse(s: &str) -> Result<Self, UpdateError> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let (numbers, pre_release) = match s.split_once('-') {
            Some((n, pre)) => (n, Some(pre.to_string())),
            None => (s, None),
        };

        let parts = numbers
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| UpdateError::InvalidVersion(s.to_string()))?;
        let [major, minor, patch] = parts[..] else {
            return Err(UpdateError::InvalidVersion(format!(
                "{}: expected 3 components, got {}",
                s,
                parts.len()
            )));
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre_release,
        })
    }

    /// Version of the running binary.
    pub fn current() -> Self {
        let num = |s: &str| s.parse::<u64>().unwrap_or(0);
        let pre = env!("CARGO_PKG_VERSION_PRE");
        Version {
            major: num(env!("CARGO_PKG_VERSION_MAJOR")),
            minor: num(env!("CARGO_PKG_VERSION_MINOR")),
            patch: num(env!("CARGO_PKG_VERSION_PATCH")),
            pre_release: (!pre.is_empty()).then(|| pre.to_string()),
        }
    }

    pub fn is_newer_than(&self, other: &Version) -> bool {
        self > other
    }

    /// Picks the highest of `versions`; the first wins among equals.
    pub fn newest<'a, I>(versions: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions.into_iter().fold(None, |best, v| match best {
            Some(b) if !v.is_newer_than(b) => Some(b),
            _ => Some(v),
        })
    }
}

/// Numeric identifiers compare numerically and sort before alphanumeric ones;
/// a tag that is a prefix of another sorts first.
fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(m), Ok(n)) => m.cmp(&n),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                // "rc.01" and "rc.1" share precedence but are different tags
                (Some(a), Some(b)) => compare_pre_release(a, b).then_with(|| a.cmp(b)),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parses_prefix_and_pre_release() {
        let parsed = v("v5.1.0-beta.2");
        assert_eq!((parsed.major, parsed.minor, parsed.patch), (5, 1, 0));
        assert_eq!(parsed.pre_release.as_deref(), Some("beta.2"));
        assert_eq!(parsed.to_string(), "5.1.0-beta.2");
    }

    #[test]
    fn rejects_wrong_component_count() {
        assert!(Version::parse("5.1").is_err());
        assert!(Version::parse("5.1.0.0").is_err());
        assert!(Version::parse("five.1.0").is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn current_matches_package_version() {
        assert_eq!(Version::current().to_string(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn stable_beats_its_pre_release() {
        assert!(v("2.0.0").is_newer_than(&v("2.0.0-rc.1")));
        assert!(!v("2.0.0-rc.1").is_newer_than(&v("2.0.0")));
        assert!(!v("2.0.0").is_newer_than(&v("2.0.0")));
        assert!(v("1.10.0").is_newer_than(&v("1.9.9")));
    }

    #[test]
    fn pre_release_tags_are_ordered() {
        assert!(v("2.0.0-beta.2") > v("2.0.0-beta.1"));
        assert!(v("2.0.0-beta.10") > v("2.0.0-beta.9"));
        assert!(v("2.0.0-rc.1") > v("2.0.0-beta.11"));
        assert!(v("2.0.0-alpha.1") > v("2.0.0-alpha"));
        assert!(v("2.0.0-alpha.beta") > v("2.0.0-alpha.1"));
    }

    #[test]
    fn ordering_agrees_with_equality() {
        let pairs = [
            ("1.0.0-beta.1", "1.0.0-beta.2"),
            ("1.0.0-rc.01", "1.0.0-rc.1"),
            ("1.0.0", "1.0.0-rc.1"),
            ("1.0.0-rc.1", "1.0.0-rc.1"),
        ];
        for (a, b) in pairs {
            let (a, b) = (v(a), v(b));
            assert_eq!(a == b, a.cmp(&b) == Ordering::Equal, "{} vs {}", a, b);
        }
    }

    #[test]
    fn newest_picks_highest() {
        let all = [v("1.0.0"), v("1.2.0"), v("1.1.5")];
        assert_eq!(Version::newest(&all), Some(&all[1]));
        assert_eq!(Version::newest(&[]), None);
    }
}
