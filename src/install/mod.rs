//! Platform-specific installation.
//!
//! Builds and runs the install invocation for the current platform family:
//! silent installer-package execution on Windows, the system package
//! installer on macOS, and the native package manager on Linux. Elevated
//! runs go through the executor's escalation wrapper; a refused or
//! unavailable elevation is reported as `Permission`, distinct from an
//! installer-reported failure.

use std::path::Path;
use std::time::Duration;

use crate::download::DownloadArtifact;
use crate::error::{OutfitterError, Result};
use crate::platform::PlatformFamily;
use crate::process::{ProcessRequest, ProcessRunner};
use crate::profile::ToolProfile;

/// How long an installer run may take before being killed.
const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// The fixed shape of one installation attempt.
///
/// Computed once per attempt from the running platform; never mutated.
#[derive(Debug, Clone)]
pub struct InstallationPlan {
    pub family: PlatformFamily,
    pub elevation_required: bool,
    pub artifact_url: String,
}

impl InstallationPlan {
    /// Build the plan for `family` from the tool's profile.
    pub fn for_family(profile: &ToolProfile, family: PlatformFamily) -> Result<Self> {
        let artifact_url = profile
            .artifact_url(family)
            .ok_or_else(|| OutfitterError::Install {
                message: format!(
                    "no installer artifact is published for '{}' on {family}",
                    profile.name
                ),
            })?
            .to_string();

        Ok(Self {
            family,
            elevation_required: family.elevation_required(),
            artifact_url,
        })
    }
}

/// Runs the platform-appropriate install procedure.
pub struct Installer<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> Installer<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Install the downloaded artifact according to the plan.
    ///
    /// Not idempotent: calling twice re-runs the installer. Skip-if-present
    /// decisions belong to the orchestrator, which checks discovery and
    /// version before deciding to install at all.
    pub fn install(&self, artifact: &DownloadArtifact, plan: &InstallationPlan) -> Result<()> {
        let request = install_request(artifact.path(), plan);
        match self.runner.run(&request) {
            Ok(_) => Ok(()),
            Err(err) => Err(classify_failure(err, plan)),
        }
    }
}

/// Build the install invocation for the plan's platform family.
fn install_request(artifact_path: &Path, plan: &InstallationPlan) -> ProcessRequest {
    let artifact = artifact_path.to_string_lossy().to_string();
    let request = match plan.family {
        PlatformFamily::Windows => {
            ProcessRequest::new("msiexec").args(["/i", artifact.as_str(), "/qn", "/norestart"])
        }
        PlatformFamily::MacOs => {
            ProcessRequest::new("installer").args(["-pkg", artifact.as_str(), "-target", "/"])
        }
        PlatformFamily::Linux => {
            ProcessRequest::new("apt-get").args(["install", "-y", artifact.as_str()])
        }
    };
    let request = request.timeout(INSTALL_TIMEOUT);
    if plan.elevation_required {
        request.elevated()
    } else {
        request
    }
}

/// Separate an elevation refusal from an installer-reported failure.
///
/// For an elevated plan, a spawn failure means the escalation wrapper
/// itself is unavailable, and the wrapper's password/terminal complaints
/// mean elevation was declined. Everything else the installer said is an
/// install failure.
fn classify_failure(err: OutfitterError, plan: &InstallationPlan) -> OutfitterError {
    if plan.elevation_required {
        if let OutfitterError::Process {
            exit_code, stderr, ..
        } = &err
        {
            if exit_code.is_none()
                || stderr.contains("a password is required")
                || stderr.contains("a terminal is required")
            {
                return OutfitterError::Permission {
                    message: if stderr.trim().is_empty() {
                        "privilege escalation unavailable".to_string()
                    } else {
                        stderr.trim().to_string()
                    },
                };
            }
        }
    }

    match err {
        OutfitterError::Process {
            exit_code, stderr, ..
        } => OutfitterError::Install {
            message: if stderr.trim().is_empty() {
                format!("installer exited with code {exit_code:?}")
            } else {
                format!("installer exited with code {exit_code:?}: {}", stderr.trim())
            },
        },
        other => other,
    }
}
