//! Changelog value model

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use chronicle_core::error::ChangelogError;
use chronicle_core::BumpKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::Version;

/// Category of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Incompatible change
    Breaking,
    /// New functionality
    Feature,
    /// Bug fix
    BugFix,
    /// Documentation-only change
    Documentation,
    /// Anything else
    Other,
}

impl ChangeType {
    const ALL: [ChangeType; 5] = [
        Self::Breaking,
        Self::Feature,
        Self::BugFix,
        Self::Documentation,
        Self::Other,
    ];

    /// All change types in rank order
    pub fn all() -> impl Iterator<Item = ChangeType> {
        let mut all = Self::ALL;
        all.sort();
        all.into_iter()
    }

    /// `(tag, section title, rank)`
    fn entry(&self) -> (&'static str, &'static str, u8) {
        match self {
            Self::Breaking => ("breaking", "Breaking Changes", 0),
            Self::Feature => ("feature", "Features", 1),
            Self::BugFix => ("bugfix", "Bug Fixes", 2),
            Self::Documentation => ("documentation", "Documentation", 3),
            Self::Other => ("other", "Other", 4),
        }
    }

    /// Serialized tag, also used as the staged file name prefix
    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    /// Rendered section title
    pub fn section_title(&self) -> &'static str {
        self.entry().1
    }

    /// Position of the section in rendered output
    pub fn rank(&self) -> u8 {
        self.entry().2
    }

    /// Whether this change alone calls for a minor bump
    pub fn is_minor(&self) -> bool {
        matches!(self, Self::Breaking | Self::Feature)
    }
}

impl PartialOrd for ChangeType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangeType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        // `break` is the tag written by older tooling
        if tag == "break" {
            return Ok(Self::Breaking);
        }
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == tag)
            .ok_or_else(|| ChangelogError::InvalidChange(format!("unknown change type: {}", s)))
    }
}

impl Serialize for ChangeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// On-disk shape of a change, before validation
#[derive(Deserialize)]
struct ChangeRecord {
    #[serde(rename = "type")]
    change_type: ChangeType,
    description: String,
    #[serde(default)]
    pull_requests: Option<Vec<String>>,
}

/// A single author-submitted change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Change category
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Free-text description, possibly multi-line
    pub description: String,
    /// Pull request references, as markdown links
    pub pull_requests: Vec<String>,
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ChangeRecord::deserialize(deserializer)?;
        Change::new(record.change_type, record.description)
            .map(|c| c.with_pull_requests(record.pull_requests.unwrap_or_default()))
            .map_err(serde::de::Error::custom)
    }
}

impl Change {
    /// Create a change; the description must not be blank
    pub fn new(
        change_type: ChangeType,
        description: impl Into<String>,
    ) -> Result<Self, ChangelogError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ChangelogError::InvalidChange(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            change_type,
            description,
            pull_requests: Vec::new(),
        })
    }

    /// Set the pull request references
    pub fn with_pull_requests(mut self, pull_requests: Vec<String>) -> Self {
        self.pull_requests = pull_requests;
        self
    }

    /// Parse a JSON change record
    pub fn from_json(text: &str) -> Result<Self, ChangelogError> {
        serde_json::from_str(text).map_err(|e| ChangelogError::InvalidChange(e.to_string()))
    }

    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json(&self) -> chronicle_core::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// An immutable, versioned set of changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release version
    pub version: Version,
    /// Changes, in the order they were discovered
    pub changes: Vec<Change>,
    /// Release date
    pub date: NaiveDate,
}

impl Release {
    /// Create a release dated today
    pub fn new(version: Version, changes: Vec<Change>) -> Self {
        Self {
            version,
            changes,
            date: Local::now().date_naive(),
        }
    }

    /// Set the release date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Changes grouped by type, in section order.
    ///
    /// Within a group changes keep their original order.
    pub fn change_map(&self) -> BTreeMap<ChangeType, Vec<&Change>> {
        let mut map: BTreeMap<ChangeType, Vec<&Change>> = BTreeMap::new();
        for change in &self.changes {
            map.entry(change.change_type).or_default().push(change);
        }
        map
    }

    /// Parse a JSON release record
    pub fn from_json(text: &str) -> Result<Self, ChangelogError> {
        serde_json::from_str(text).map_err(|e| ChangelogError::InvalidChange(e.to_string()))
    }

    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json(&self) -> chronicle_core::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Bump implied by a set of changes: minor for any feature or breaking change
pub fn default_bump<'a>(changes: impl IntoIterator<Item = &'a Change>) -> BumpKind {
    if changes.into_iter().any(|c| c.change_type.is_minor()) {
        BumpKind::Minor
    } else {
        BumpKind::Patch
    }
}
