//! Version probing of a located binary.

use std::time::Duration;

use crate::error::{OutfitterError, Result};
use crate::locate::ToolLocation;
use crate::process::{ProcessRequest, ProcessRunner};
use crate::profile::ToolProfile;

use super::ToolVersion;

/// Deadline for a version query; the binary only has to print a line.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries a located binary for its version.
pub struct VersionProbe<'a> {
    profile: &'a ToolProfile,
    runner: &'a dyn ProcessRunner,
}

impl<'a> VersionProbe<'a> {
    pub fn new(profile: &'a ToolProfile, runner: &'a dyn ProcessRunner) -> Self {
        Self { profile, runner }
    }

    /// Run the binary with the version-query argument and parse the first
    /// stdout line carrying a version.
    ///
    /// A binary that runs but prints no recognizable version fails with
    /// `VersionParse`; a binary that cannot run at all fails with the
    /// process-level error. The two faults stay distinguishable.
    pub fn probe(&self, location: &ToolLocation) -> Result<ToolVersion> {
        let request = ProcessRequest::new(location.path.to_string_lossy())
            .arg(&self.profile.version_arg)
            .timeout(PROBE_TIMEOUT);
        let result = self.runner.run(&request)?;
        parse_version_output(&self.profile.name, &result.stdout)
    }
}

/// Find the first stdout line carrying a recognizable version.
fn parse_version_output(tool: &str, stdout: &str) -> Result<ToolVersion> {
    stdout
        .lines()
        .find_map(ToolVersion::parse)
        .ok_or_else(|| OutfitterError::VersionParse {
            tool: tool.to_string(),
            output: stdout.trim().to_string(),
        })
}
