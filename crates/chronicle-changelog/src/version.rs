//! Three-part release version

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chronicle_core::error::VersionError;
use chronicle_core::BumpKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `major.minor.patch` version.
///
/// Ordering is lexicographic on `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    /// Major version
    pub major: u64,
    /// Minor version
    pub minor: u64,
    /// Patch version
    pub patch: u64,
}

impl Version {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Apply a bump. Major is never incremented automatically.
    pub fn bump(&self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }

    /// Parse the version encoded in a `major.minor.patch.ext` file name.
    ///
    /// A name that does not follow the scheme is a format error carrying the
    /// file name.
    pub fn from_path(path: &Path) -> Result<Self, VersionError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let invalid = || VersionError::InvalidFormat(name.to_string());

        let parts: Vec<&str> = name.splitn(4, '.').collect();
        if parts.len() != 4 || parts[3].is_empty() {
            return Err(invalid());
        }
        parse_components(&parts[..3]).ok_or_else(invalid)
    }
}

fn parse_components(parts: &[&str]) -> Option<Version> {
    let mut numbers = parts.iter().map(|p| {
        if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
            None
        } else {
            p.parse::<u64>().ok()
        }
    });
    Some(Version::new(
        numbers.next()??,
        numbers.next()??,
        numbers.next()??,
    ))
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }
        parse_components(&parts).ok_or_else(|| VersionError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
