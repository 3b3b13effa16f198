//! Tooling & Integration Layer
//!
//! Command-line host for the outline document.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, TerminalConfirm};
