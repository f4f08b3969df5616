//! Tool version representation and parsing.
//!
//! # Modules
//!
//! - [`probe`] - Version probing of a located binary

pub mod probe;

pub use probe::VersionProbe;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Pattern for a three-component version anywhere in a line. A leading
/// marker such as "v" is tolerated because matching starts at the first
/// digit.
const VERSION_PATTERN: &str = r"(\d+)\.(\d+)\.(\d+)";

/// A parsed tool version.
///
/// Ordering and equality are defined lexicographically on the
/// (major, minor, patch) triple; the raw string is kept for display only
/// and never participates in comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ToolVersion {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            raw: None,
        }
    }

    /// Parse a version from a line of output.
    ///
    /// Returns `None` when the line carries no recognizable version token.
    /// Callers decide what that means: for a probe it is a parse failure
    /// distinct from the tool being absent.
    pub fn parse(line: &str) -> Option<Self> {
        let re = regex::Regex::new(VERSION_PATTERN).ok()?;
        let caps = re.captures(line)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
            raw: Some(line.trim().to_string()),
        })
    }

    fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialEq for ToolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for ToolVersion {}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ToolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolVersion::parse(s).ok_or_else(|| format!("unrecognized version: {s}"))
    }
}
