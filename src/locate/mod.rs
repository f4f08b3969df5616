//! Tool discovery.
//!
//! Finds an existing installation of the target tool with the search
//! strategy of the current platform family: Windows walks a fixed list of
//! well-known install directories before falling back to PATH resolution,
//! while the Unix families rely solely on PATH. Candidates are validated
//! with a low-cost existence and executability check; version probing is a
//! separate step.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{OutfitterError, Result};
use crate::platform::PlatformFamily;
use crate::profile::ToolProfile;

/// Where a discovered binary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationOrigin {
    /// Resolved through the execution-path variable.
    OnPath,
    /// Found in a well-known install directory.
    WellKnownDirectory,
}

/// Absolute path to a candidate tool binary, valid for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ToolLocation {
    pub path: PathBuf,
    pub origin: LocationOrigin,
}

/// Discovers an existing installation of the target tool.
///
/// Search inputs are captured at construction, so two `locate` calls on an
/// unchanged machine return the same result.
pub struct Locator {
    tool: String,
    filename: String,
    /// Well-known directories, in priority order. Empty on PATH-only families.
    search_dirs: Vec<PathBuf>,
    path_entries: Vec<PathBuf>,
}

impl Locator {
    /// Build a locator for the profile on the given platform family.
    pub fn new(profile: &ToolProfile, family: PlatformFamily) -> Self {
        let search_dirs = match family {
            PlatformFamily::Windows => profile.windows_search_dirs.clone(),
            PlatformFamily::MacOs | PlatformFamily::Linux => Vec::new(),
        };
        Self {
            tool: profile.name.clone(),
            filename: profile.binary_filename(family),
            search_dirs,
            path_entries: parse_system_path(),
        }
    }

    /// Build a locator over explicit directories instead of the live
    /// environment. This allows testing without changing the process PATH.
    pub fn with_entries(
        tool: impl Into<String>,
        filename: impl Into<String>,
        search_dirs: Vec<PathBuf>,
        path_entries: Vec<PathBuf>,
    ) -> Self {
        Self {
            tool: tool.into(),
            filename: filename.into(),
            search_dirs,
            path_entries,
        }
    }

    /// Search for the tool: well-known directories first, then PATH.
    pub fn locate(&self) -> Result<ToolLocation> {
        for dir in &self.search_dirs {
            let candidate = dir.join(&self.filename);
            if candidate.is_file() && is_executable(&candidate) {
                return Ok(ToolLocation {
                    path: candidate,
                    origin: LocationOrigin::WellKnownDirectory,
                });
            }
        }

        resolve_on_path(&self.filename, &self.path_entries)
            .map(|path| ToolLocation {
                path,
                origin: LocationOrigin::OnPath,
            })
            .ok_or_else(|| OutfitterError::ToolNotFound {
                tool: self.tool.clone(),
            })
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a binary by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command — `which` behavior varies across systems and
/// is sometimes a shell builtin with inconsistent error handling.
pub fn resolve_on_path(filename: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(filename);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}
