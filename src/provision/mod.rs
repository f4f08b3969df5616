//! Provisioning orchestration.
//!
//! Drives one idempotent "ensure the tool is ready" operation through the
//! states `Locating → {Ready | Downloading} → Installing → Verifying →
//! {Ready | Failed}`. The orchestrator is the single place that interprets
//! lower-level failures: absence during discovery routes to installation,
//! while failures from Downloading onward are terminal and surfaced tagged
//! with the stage they occurred in.
//!
//! # Modules
//!
//! - [`progress`] - Attempt-scoped progress reporting

pub mod progress;

pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter};

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use serde::Serialize;

use crate::download::Downloader;
use crate::error::{OutfitterError, Result};
use crate::install::{InstallationPlan, Installer};
use crate::locate::{Locator, ToolLocation};
use crate::platform::PlatformFamily;
use crate::process::ProcessRunner;
use crate::profile::ToolProfile;
use crate::version::{ToolVersion, VersionProbe};

/// The stage a provisioning attempt is in when a terminal failure occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Locating,
    Downloading,
    Installing,
    Verifying,
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionStage::Locating => "locating",
            ProvisionStage::Downloading => "downloading",
            ProvisionStage::Installing => "installing",
            ProvisionStage::Verifying => "verifying",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful `ensure` call.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionOutcome {
    /// The verified binary.
    pub location: ToolLocation,
    /// Its probed version.
    pub version: ToolVersion,
    /// Whether an installation was performed during this attempt.
    pub installed: bool,
}

/// Orchestrates tool provisioning.
///
/// Holds no state across `ensure` calls; every call is a fresh run through
/// discovery.
pub struct Provisioner<'a> {
    profile: &'a ToolProfile,
    family: PlatformFamily,
    runner: &'a dyn ProcessRunner,
    downloader: Downloader,
    download_dir: PathBuf,
    reporter: ProgressReporter,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        profile: &'a ToolProfile,
        family: PlatformFamily,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            profile,
            family,
            runner,
            downloader: Downloader::new(),
            download_dir: std::env::temp_dir(),
            reporter: ProgressReporter::silent(),
        }
    }

    /// Report progress through the given reporter for this attempt.
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Override the downloader (e.g., with a shorter timeout).
    pub fn with_downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = downloader;
        self
    }

    /// Override where downloaded artifacts are staged.
    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = dir;
        self
    }

    /// Ensure the tool is present at `minimum` or newer, installing it if
    /// it is absent or outdated, and return the verified binary.
    ///
    /// A second concurrent call for the same tool is rejected with
    /// `InProgress`; installs targeting the same binary path must never
    /// interleave.
    pub fn ensure(&self, minimum: &ToolVersion) -> Result<ProvisionOutcome> {
        let _guard = AttemptGuard::acquire(&self.profile.name)?;

        self.reporter.emit(ProgressEvent::Locating {
            tool: self.profile.name.clone(),
        });
        if let Some(outcome) = self.locate_compatible(minimum)? {
            return Ok(outcome);
        }

        let plan = InstallationPlan::for_family(self.profile, self.family)
            .map_err(|e| stage_error(ProvisionStage::Downloading, e))?;

        self.reporter.emit(ProgressEvent::Downloading {
            url: plan.artifact_url.clone(),
        });
        let artifact = self
            .downloader
            .download(&plan.artifact_url, &self.download_dir)
            .map_err(|e| stage_error(ProvisionStage::Downloading, e))?;
        self.reporter.emit(ProgressEvent::Downloaded {
            bytes: artifact.len(),
        });

        self.reporter.emit(ProgressEvent::Installing {
            elevated: plan.elevation_required,
        });
        Installer::new(self.runner)
            .install(&artifact, &plan)
            .map_err(|e| stage_error(ProvisionStage::Installing, e))?;

        self.reporter.emit(ProgressEvent::Verifying {
            tool: self.profile.name.clone(),
        });
        let outcome = self
            .verify(minimum)
            .map_err(|e| stage_error(ProvisionStage::Verifying, e))?;
        self.reporter.emit(ProgressEvent::Ready {
            path: outcome.location.path.clone(),
            version: outcome.version.clone(),
        });
        Ok(outcome)
    }

    /// The Locating state: `Ok(Some)` is terminal success with no install,
    /// `Ok(None)` routes to Downloading.
    ///
    /// A tool that is absent, below the minimum, or answers the probe with
    /// something unusable is reinstalled rather than reported as fatal.
    fn locate_compatible(&self, minimum: &ToolVersion) -> Result<Option<ProvisionOutcome>> {
        let location = match Locator::new(self.profile, self.family).locate() {
            Ok(location) => location,
            Err(OutfitterError::ToolNotFound { .. }) => return Ok(None),
            Err(other) => return Err(stage_error(ProvisionStage::Locating, other)),
        };
        self.reporter.emit(ProgressEvent::Located {
            path: location.path.clone(),
        });

        match VersionProbe::new(self.profile, self.runner).probe(&location) {
            Ok(version) if &version >= minimum => {
                self.reporter.emit(ProgressEvent::Ready {
                    path: location.path.clone(),
                    version: version.clone(),
                });
                Ok(Some(ProvisionOutcome {
                    location,
                    version,
                    installed: false,
                }))
            }
            Ok(version) => {
                tracing::debug!(
                    "Found {} {} below required {}, reinstalling",
                    self.profile.name,
                    version,
                    minimum
                );
                Ok(None)
            }
            Err(
                OutfitterError::VersionParse { .. }
                | OutfitterError::Process { .. }
                | OutfitterError::Timeout { .. },
            ) => {
                tracing::warn!(
                    "Existing {} at {} is unusable, reinstalling",
                    self.profile.name,
                    location.path.display()
                );
                Ok(None)
            }
            Err(other) => Err(stage_error(ProvisionStage::Locating, other)),
        }
    }

    /// The Verifying state: re-run discovery and the probe; any shortfall
    /// here means the installer reported success but the tool is still not
    /// usable.
    fn verify(&self, minimum: &ToolVersion) -> Result<ProvisionOutcome> {
        let tool = self.profile.name.clone();

        let location = Locator::new(self.profile, self.family).locate().map_err(|e| {
            OutfitterError::PostInstallVerification {
                tool: tool.clone(),
                message: e.to_string(),
            }
        })?;

        let version = VersionProbe::new(self.profile, self.runner)
            .probe(&location)
            .map_err(|e| OutfitterError::PostInstallVerification {
                tool: tool.clone(),
                message: e.to_string(),
            })?;

        if &version >= minimum {
            Ok(ProvisionOutcome {
                location,
                version,
                installed: true,
            })
        } else {
            Err(OutfitterError::PostInstallVerification {
                tool,
                message: format!("installed version {version} is below required {minimum}"),
            })
        }
    }
}

fn stage_error(stage: ProvisionStage, source: OutfitterError) -> OutfitterError {
    OutfitterError::Stage {
        stage,
        source: Box::new(source),
    }
}

/// Process-wide set of tools with a provisioning attempt in flight.
fn in_flight() -> &'static Mutex<HashSet<String>> {
    static IN_FLIGHT: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    IN_FLIGHT.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Holds a tool's in-flight slot; released on drop, on every exit path.
struct AttemptGuard {
    tool: String,
}

impl AttemptGuard {
    fn acquire(tool: &str) -> Result<Self> {
        let mut set = in_flight().lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(tool.to_string()) {
            return Err(OutfitterError::InProgress {
                tool: tool.to_string(),
            });
        }
        Ok(Self {
            tool: tool.to_string(),
        })
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        let mut set = in_flight().lock().unwrap_or_else(PoisonError::into_inner);
        set.remove(&self.tool);
    }
}
