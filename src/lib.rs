//! Outfitter - keeps required command-line tools installed and up to date.
//!
//! Outfitter ensures an external command-line tool is present on the host
//! at a compatible version: it discovers an existing installation, probes
//! its version, and, when the tool is absent or outdated, downloads the
//! platform's installer artifact and runs the platform-appropriate install
//! procedure, elevating privileges where required.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`download`] - Installer artifact download
//! - [`error`] - Error types and result alias
//! - [`install`] - Installation plans and platform install procedures
//! - [`locate`] - Discovery of existing installations
//! - [`platform`] - Platform family strategies and privilege checks
//! - [`process`] - Child process execution
//! - [`profile`] - Target tool descriptions
//! - [`provision`] - Orchestration of one "ensure" attempt
//! - [`version`] - Version parsing, comparison, and probing
//!
//! # Example
//!
//! ```no_run
//! use outfitter::platform::PlatformFamily;
//! use outfitter::process::SystemRunner;
//! use outfitter::profile::ToolProfile;
//! use outfitter::provision::Provisioner;
//! use outfitter::version::ToolVersion;
//!
//! let profile = ToolProfile::new("mytool")
//!     .with_artifact_url(PlatformFamily::Linux, "https://example.com/mytool.deb");
//! let runner = SystemRunner::new();
//! let provisioner = Provisioner::new(&profile, PlatformFamily::current(), &runner);
//! let outcome = provisioner.ensure(&ToolVersion::new(1, 0, 0)).unwrap();
//! println!("ready: {}", outcome.location.path.display());
//! ```

pub mod cli;
pub mod download;
pub mod error;
pub mod install;
pub mod locate;
pub mod platform;
pub mod process;
pub mod profile;
pub mod provision;
pub mod version;

pub use error::{OutfitterError, Result};
