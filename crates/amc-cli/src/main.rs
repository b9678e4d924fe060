//! amcompose binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use amc_cli::cli::{Cli, Commands};
use amc_cli::commands::{ComposeCommand, RelabelCommand, ValidateCommand};
use amc_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<(), amc_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Compose(args) => ComposeCommand::new(args).execute(&mut stdout, &format),
        Commands::Validate(args) => ValidateCommand::new(args).execute(&mut stdout, &format),
        Commands::Relabel(args) => RelabelCommand::new(args).execute(&mut stdout, &format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_with_missing_base_fails() {
        let cli = Cli::parse_from([
            "amcompose",
            "compose",
            "--base",
            "/nonexistent/base.yaml",
            "--tenants",
            "/nonexistent/t.yaml",
        ]);
        assert!(run(&cli).is_err());
    }

    #[test]
    fn run_relabel_with_bad_version_fails() {
        let cli = Cli::parse_from(["amcompose", "relabel", "-p", "latest", "rules.yaml"]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("invalid Prometheus version"));
    }
}
