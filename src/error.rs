//! Error types for Outfitter operations.
//!
//! This module defines [`OutfitterError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Lower-level components never retry and never swallow errors; each
//!   returns a typed failure to its caller
//! - The provisioning orchestrator is the single place that interprets
//!   failures and tags terminal ones with the stage they occurred in
//! - Use `anyhow::Error` (via `OutfitterError::Other`) for unexpected errors

use std::time::Duration;
use thiserror::Error;

use crate::provision::ProvisionStage;

/// Core error type for Outfitter operations.
#[derive(Debug, Error)]
pub enum OutfitterError {
    /// No candidate binary was discovered by any search strategy.
    #[error("'{tool}' was not found on this machine")]
    ToolNotFound { tool: String },

    /// The binary ran successfully but printed no recognizable version.
    #[error("Could not parse a version for '{tool}' from output: {output}")]
    VersionParse { tool: String, output: String },

    /// A child process exited with a non-zero code, or could not be spawned
    /// at all (`exit_code` is `None`).
    #[error("Command failed with exit code {exit_code:?}: {command}")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A child process was killed after exceeding its deadline.
    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    /// The artifact server answered with a non-success status.
    #[error("Download of {url} failed with HTTP {status}")]
    Download { url: String, status: u16 },

    /// The installer process reported failure.
    #[error("Installation failed: {message}")]
    Install { message: String },

    /// Privilege elevation was declined or unavailable.
    #[error("Elevation failed: {message}")]
    Permission { message: String },

    /// The installer reported success but the tool is still missing or
    /// below the required version.
    #[error("'{tool}' is not usable after installation: {message}")]
    PostInstallVerification { tool: String, message: String },

    /// Another provisioning attempt for the same tool is already running.
    #[error("Provisioning of '{tool}' is already in progress")]
    InProgress { tool: String },

    /// A terminal failure, tagged with the provisioning stage it occurred in.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: ProvisionStage,
        #[source]
        source: Box<OutfitterError>,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error wrapper.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OutfitterError {
    /// The underlying failure, looking through stage tagging.
    pub fn root(&self) -> &OutfitterError {
        match self {
            OutfitterError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// The provisioning stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<ProvisionStage> {
        match self {
            OutfitterError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias for Outfitter operations.
pub type Result<T> = std::result::Result<T, OutfitterError>;
