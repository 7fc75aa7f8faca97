//! Core types for Chronicle

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Kind of version increment applied to a base version.
///
/// Major is never incremented automatically; a major release requires an
/// explicit version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// `major.(minor + 1).0`
    Minor,
    /// `major.minor.(patch + 1)`
    Patch,
}

impl BumpKind {
    /// Returns the string representation of the bump kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl std::fmt::Display for BumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(VersionError::InvalidBumpKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_kind_from_str() {
        assert_eq!("minor".parse::<BumpKind>().unwrap(), BumpKind::Minor);
        assert_eq!("PATCH".parse::<BumpKind>().unwrap(), BumpKind::Patch);
        assert!("major".parse::<BumpKind>().is_err());
    }

    #[test]
    fn test_bump_kind_display() {
        assert_eq!(BumpKind::Minor.to_string(), "minor");
        assert_eq!(BumpKind::Patch.to_string(), "patch");
    }
}
