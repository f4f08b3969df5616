//! Command implementations.

use serde::Serialize;

use crate::error::Result;
use crate::locate::{Locator, ToolLocation};
use crate::platform::PlatformFamily;
use crate::process::SystemRunner;
use crate::profile::ToolProfile;
use crate::provision::{ProgressReporter, Provisioner};
use crate::version::{ToolVersion, VersionProbe};

use super::args::{Cli, Commands, EnsureArgs, LocateArgs};

/// Dispatch the parsed CLI to its command.
pub fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Ensure(args) => ensure(args, cli.quiet),
        Commands::Locate(args) => locate(args),
    }
}

fn build_profile(
    tool: &str,
    version_arg: &str,
    windows_extension: &str,
    artifact_url: Option<&str>,
) -> ToolProfile {
    let mut profile = ToolProfile::new(tool)
        .with_version_arg(version_arg)
        .with_windows_extension(windows_extension);
    if let Some(url) = artifact_url {
        profile = profile.with_artifact_url(PlatformFamily::current(), url);
    }
    profile
}

fn ensure(args: &EnsureArgs, quiet: bool) -> Result<()> {
    let profile = build_profile(
        &args.tool,
        &args.version_arg,
        &args.windows_extension,
        args.artifact_url.as_deref(),
    );
    let runner = SystemRunner::new();

    let reporter = if quiet || args.json {
        ProgressReporter::silent()
    } else {
        ProgressReporter::new(Box::new(|event| println!("{event}")))
    };

    let provisioner =
        Provisioner::new(&profile, PlatformFamily::current(), &runner).with_reporter(reporter);
    let outcome = provisioner.ensure(&args.min_version)?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else {
        println!(
            "{} {} at {}",
            args.tool,
            outcome.version,
            outcome.location.path.display()
        );
    }
    Ok(())
}

/// Report for a `locate` run.
#[derive(Serialize)]
struct LocateReport<'a> {
    location: &'a ToolLocation,
    version: &'a ToolVersion,
}

fn locate(args: &LocateArgs) -> Result<()> {
    let profile = build_profile(&args.tool, &args.version_arg, &args.windows_extension, None);
    let runner = SystemRunner::new();

    let location = Locator::new(&profile, PlatformFamily::current()).locate()?;
    let version = VersionProbe::new(&profile, &runner).probe(&location)?;

    if args.json {
        let report = LocateReport {
            location: &location,
            version: &version,
        };
        let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else {
        println!("{} {} at {}", args.tool, version, location.path.display());
    }
    Ok(())
}
