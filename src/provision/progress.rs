//! Attempt-scoped progress reporting.
//!
//! The orchestrator reports through a [`ProgressReporter`] handed to it for
//! one attempt, and through nothing else; there is no ambient status
//! channel. Callers that do not care pass [`ProgressReporter::silent`].

use std::fmt;
use std::path::PathBuf;

use crate::version::ToolVersion;

/// A notification emitted during one provisioning attempt.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Discovery started.
    Locating { tool: String },
    /// An existing installation was found.
    Located { path: PathBuf },
    /// Download of the installer artifact started.
    Downloading { url: String },
    /// Download finished.
    Downloaded { bytes: u64 },
    /// Installer started.
    Installing { elevated: bool },
    /// Post-install verification started.
    Verifying { tool: String },
    /// The tool is ready.
    Ready { path: PathBuf, version: ToolVersion },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Locating { tool } => write!(f, "Looking for {tool}..."),
            ProgressEvent::Located { path } => write!(f, "Found {}", path.display()),
            ProgressEvent::Downloading { url } => write!(f, "Downloading {url}..."),
            ProgressEvent::Downloaded { bytes } => write!(f, "Downloaded {bytes} bytes"),
            ProgressEvent::Installing { elevated } => {
                if *elevated {
                    write!(f, "Installing (elevated)...")
                } else {
                    write!(f, "Installing...")
                }
            }
            ProgressEvent::Verifying { tool } => write!(f, "Verifying {tool}..."),
            ProgressEvent::Ready { path, version } => {
                write!(f, "{} {version} is ready", path.display())
            }
        }
    }
}

/// Callback invoked for each progress event during an attempt.
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send>;

/// Attempt-scoped progress sink.
#[derive(Default)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    /// Report through the given callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// A reporter that discards all events.
    pub fn silent() -> Self {
        Self { callback: None }
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }
}
