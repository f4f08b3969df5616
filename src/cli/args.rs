//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};

use crate::version::ToolVersion;

/// Outfitter - keeps required command-line tools installed and up to date.
#[derive(Debug, Parser)]
#[command(name = "outfitter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ensure a tool is installed at a compatible version
    Ensure(EnsureArgs),

    /// Find an existing installation without installing anything
    Locate(LocateArgs),
}

/// Arguments for the `ensure` command.
#[derive(Debug, Clone, clap::Args)]
pub struct EnsureArgs {
    /// Tool binary name, without extension
    pub tool: String,

    /// Minimum acceptable version (e.g., 1.0.0)
    #[arg(short, long)]
    pub min_version: ToolVersion,

    /// Installer artifact URL for this platform
    #[arg(long)]
    pub artifact_url: Option<String>,

    /// Argument used to query the tool's version
    #[arg(long, default_value = "--version")]
    pub version_arg: String,

    /// Binary extension used on Windows
    #[arg(long, default_value = "exe")]
    pub windows_extension: String,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `locate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LocateArgs {
    /// Tool binary name, without extension
    pub tool: String,

    /// Argument used to query the tool's version
    #[arg(long, default_value = "--version")]
    pub version_arg: String,

    /// Binary extension used on Windows
    #[arg(long, default_value = "exe")]
    pub windows_extension: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
