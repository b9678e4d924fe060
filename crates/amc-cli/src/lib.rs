//! # amc-cli
//!
//! Command-line front end for `amc-compose` and `amc-relabel`.
//!
//! Provides commands for:
//! - Composing a base Alertmanager configuration with tenant files
//! - Validating tenant files
//! - Validating relabel rules against a Prometheus version
//!
//! Reports are printed as tables or JSON; logs go to stderr and are
//! controlled with `RUST_LOG`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod inputs;
pub mod output;

pub use cli::{Cli, Commands, ComposeArgs, Format, RelabelArgs, ValidateArgs};
pub use error::CliError;
pub use output::OutputFormat;
