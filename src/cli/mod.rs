//! Command-line interface.
//!
//! A thin layer over the provisioning library: argument parsing and
//! terminal rendering of outcomes. Everything it prints comes from the
//! library's progress events and results.

mod args;
mod commands;

pub use args::{Cli, Commands, EnsureArgs, LocateArgs};
pub use commands::dispatch;
