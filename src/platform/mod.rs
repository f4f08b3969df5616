//! Host platform detection and privilege checks.
//!
//! Platform differences are modeled as a small set of named strategy
//! variants selected once at startup and injected where needed, instead of
//! conditionals scattered through the orchestrator.

use std::fmt;

/// The platform families with distinct discovery and install procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    /// Searches well-known install directories before PATH; installs via
    /// silent installer-package execution.
    Windows,
    /// PATH-only discovery; installs via the system package installer with
    /// elevation.
    MacOs,
    /// PATH-only discovery; installs via the native package manager with
    /// elevation.
    Linux,
}

impl PlatformFamily {
    /// The family of the running host.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            PlatformFamily::Windows
        } else if cfg!(target_os = "macos") {
            PlatformFamily::MacOs
        } else {
            PlatformFamily::Linux
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            PlatformFamily::Windows => "windows",
            PlatformFamily::MacOs => "macos",
            PlatformFamily::Linux => "linux",
        }
    }

    /// Whether installation on this family requires privilege elevation
    /// from the executor. Windows installers elevate themselves through the
    /// OS consent mechanism, so the executor runs them directly.
    pub fn elevation_required(&self) -> bool {
        match self {
            PlatformFamily::Windows => false,
            PlatformFamily::MacOs | PlatformFamily::Linux => true,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check if running as root/admin.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        std::env::var("ADMIN").is_ok()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}
