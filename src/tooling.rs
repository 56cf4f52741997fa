//! Tooling & Integration Layer
//!
//! Command-line entry points over the live filesystem and layout documents.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
