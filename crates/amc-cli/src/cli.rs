//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use amc_compose::{MatcherStrategy, DEFAULT_TLS_ASSETS_DIR};

/// amcompose - multi-tenant Alertmanager configuration composer.
#[derive(Parser, Debug, Clone)]
#[command(name = "amcompose")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for reports.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// How tenant routes are confined to their namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Match only alerts carrying the tenant namespace label.
    #[default]
    #[value(name = "OnNamespace")]
    OnNamespace,
    /// Leave tenant matchers untouched.
    #[value(name = "None")]
    None,
}

impl From<Strategy> for MatcherStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::OnNamespace => Self::OnNamespace,
            Strategy::None => Self::None,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compose a base configuration with tenant configurations.
    Compose(ComposeArgs),

    /// Validate tenant configurations without composing them.
    Validate(ValidateArgs),

    /// Validate relabel rules against a Prometheus version.
    Relabel(RelabelArgs),
}

/// Arguments for the compose command.
#[derive(Parser, Debug, Clone)]
pub struct ComposeArgs {
    /// Base Alertmanager configuration (YAML).
    #[arg(short, long)]
    pub base: PathBuf,

    /// Tenant configuration files; each may hold several YAML documents.
    #[arg(short, long, num_args = 1.., required = true)]
    pub tenants: Vec<PathBuf>,

    /// Secrets and configmaps referenced by tenants.
    #[arg(short, long)]
    pub secrets: Option<PathBuf>,

    /// Write the composed configuration here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory Alertmanager reads TLS assets from.
    #[arg(long, env = "AMC_TLS_ASSETS_DIR", default_value = DEFAULT_TLS_ASSETS_DIR)]
    pub tls_assets_dir: PathBuf,

    /// Write every referenced TLS asset into this directory.
    #[arg(long)]
    pub tls_assets_out: Option<PathBuf>,

    /// How tenant routes and inhibition rules are confined.
    #[arg(long, value_enum, env = "AMC_MATCHER_STRATEGY", default_value_t = Strategy::OnNamespace)]
    pub matcher_strategy: Strategy,

    /// Drop invalid tenants instead of failing.
    #[arg(long)]
    pub skip_invalid: bool,
}

/// Arguments for the validate command.
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Tenant configuration files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the relabel command.
#[derive(Parser, Debug, Clone)]
pub struct RelabelArgs {
    /// Prometheus version the rules are meant for, e.g. `v2.45.0`.
    #[arg(short = 'p', long, env = "AMC_PROMETHEUS_VERSION")]
    pub prometheus_version: String,

    /// YAML file holding a list of relabel rules.
    pub file: PathBuf,
}
