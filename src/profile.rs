//! Target tool description.
//!
//! A [`ToolProfile`] is the static description of the tool being
//! provisioned: what the binary is called, how to ask it for its version,
//! where its installer artifacts live, and which directories to search on
//! Windows. The profile is built once and read-only for the duration of a
//! provisioning attempt.

use std::path::PathBuf;

use crate::platform::PlatformFamily;

/// Installer artifact URL per platform family.
#[derive(Debug, Clone, Default)]
pub struct ArtifactUrls {
    pub windows: Option<String>,
    pub macos: Option<String>,
    pub linux: Option<String>,
}

/// Static description of the tool being provisioned.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    /// Tool name as invoked, without extension.
    pub name: String,
    /// Argument passed to the binary to query its version.
    pub version_arg: String,
    /// Binary file extension on Windows (e.g., "exe", "cmd").
    pub windows_extension: String,
    /// Well-known install directories searched on Windows, in priority order.
    pub windows_search_dirs: Vec<PathBuf>,
    /// Installer artifact URLs.
    pub artifact_urls: ArtifactUrls,
}

impl ToolProfile {
    /// Create a profile with defaults: `--version` query, `exe` extension,
    /// and the standard Windows install directories for the tool name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            version_arg: "--version".to_string(),
            windows_extension: "exe".to_string(),
            windows_search_dirs: default_windows_search_dirs(&name),
            artifact_urls: ArtifactUrls::default(),
            name,
        }
    }

    /// Override the version-query argument.
    pub fn with_version_arg(mut self, arg: impl Into<String>) -> Self {
        self.version_arg = arg.into();
        self
    }

    /// Override the Windows binary extension.
    pub fn with_windows_extension(mut self, ext: impl Into<String>) -> Self {
        self.windows_extension = ext.into();
        self
    }

    /// Override the Windows search directories.
    pub fn with_windows_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.windows_search_dirs = dirs;
        self
    }

    /// Set the installer artifact URL for one platform family.
    pub fn with_artifact_url(mut self, family: PlatformFamily, url: impl Into<String>) -> Self {
        let url = url.into();
        match family {
            PlatformFamily::Windows => self.artifact_urls.windows = Some(url),
            PlatformFamily::MacOs => self.artifact_urls.macos = Some(url),
            PlatformFamily::Linux => self.artifact_urls.linux = Some(url),
        }
        self
    }

    /// Filename of the tool binary on the given family.
    pub fn binary_filename(&self, family: PlatformFamily) -> String {
        match family {
            PlatformFamily::Windows => format!("{}.{}", self.name, self.windows_extension),
            PlatformFamily::MacOs | PlatformFamily::Linux => self.name.clone(),
        }
    }

    /// Installer artifact URL for the given family, if one is published.
    pub fn artifact_url(&self, family: PlatformFamily) -> Option<&str> {
        match family {
            PlatformFamily::Windows => self.artifact_urls.windows.as_deref(),
            PlatformFamily::MacOs => self.artifact_urls.macos.as_deref(),
            PlatformFamily::Linux => self.artifact_urls.linux.as_deref(),
        }
    }
}

/// Fixed, ordered list of well-known Windows install directories for a tool.
///
/// Read once at profile construction so the search order stays stable for
/// the lifetime of the profile.
fn default_windows_search_dirs(tool: &str) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Ok(base) = std::env::var(var) {
            dirs.push(PathBuf::from(base).join(tool));
        }
    }
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        dirs.push(PathBuf::from(local).join("Programs").join(tool));
    }
    dirs
}
