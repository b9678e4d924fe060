//! Compose command implementation.
//!
//! Merges the base configuration with every tenant file and writes the
//! resulting Alertmanager YAML to stdout or to `--output`.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use amc_compose::{ComposerConfig, ConfigComposer, SecretStore, TlsAssetKey};

use crate::cli::ComposeArgs;
use crate::error::CliError;
use crate::inputs::{load_base, load_secrets, load_tenants};
use crate::output::{CheckResult, ComposeSummary, OutputFormat};

/// Compose command executor.
pub struct ComposeCommand<'a> {
    args: &'a ComposeArgs,
}

impl<'a> ComposeCommand<'a> {
    /// Create a new compose command.
    #[must_use]
    pub const fn new(args: &'a ComposeArgs) -> Self {
        Self { args }
    }

    /// Execute the compose command.
    ///
    /// Without `--output` the composed YAML goes to `writer`; with it, the
    /// YAML goes to the file and a summary goes to `writer`.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let args = self.args;
        let base = load_base(&args.base)?;
        let tenants = load_tenants(&args.tenants)?;
        let secrets = load_secrets(args.secrets.as_deref())?;

        let config = ComposerConfig::default()
            .with_tls_assets_dir(args.tls_assets_dir.clone())
            .with_matcher_strategy(args.matcher_strategy.into());
        let composer = ConfigComposer::with_config(&secrets, config);

        let (tenants, rejected) = if args.skip_invalid {
            let selection = composer.select(&base, &tenants);
            let rejected = selection
                .rejected
                .into_iter()
                .map(|r| CheckResult::failed(r.key, r.error))
                .collect();
            (selection.accepted, rejected)
        } else {
            (tenants, Vec::new())
        };

        let composition = composer.build(&base, &tenants)?;
        let yaml = composition.to_yaml()?;

        if let Some(dir) = &args.tls_assets_out {
            write_tls_assets(&secrets, &composition.tls_assets, dir)?;
        }

        let Some(path) = &args.output else {
            writer.write_all(&yaml)?;
            return Ok(());
        };

        fs::write(path, &yaml).map_err(|e| CliError::input(path, e))?;
        info!(path = %path.display(), bytes = yaml.len(), "wrote composed configuration");

        let summary = ComposeSummary {
            output: path.display().to_string(),
            tenants: composition.tenants.iter().map(ToString::to_string).collect(),
            receivers: composition.config.receivers.len(),
            rejected,
            tls_assets: composition
                .tls_assets
                .iter()
                .map(|key| key.path_in(&args.tls_assets_dir))
                .collect(),
        };
        format.write(writer, &summary)
    }
}

/// Writes the bytes behind every referenced TLS asset into `dir`.
fn write_tls_assets(
    secrets: &SecretStore,
    assets: &BTreeSet<TlsAssetKey>,
    dir: &Path,
) -> Result<(), CliError> {
    fs::create_dir_all(dir).map_err(|e| CliError::input(dir, e))?;

    for key in assets {
        let bytes = secrets
            .tls_asset(key)
            .map_err(|e| CliError::InvalidArgument(format!("TLS asset {key}: {e}")))?;
        let path = dir.join(key.to_string());
        fs::write(&path, bytes).map_err(|e| CliError::input(&path, e))?;
    }

    info!(dir = %dir.display(), assets = assets.len(), "wrote TLS assets");
    Ok(())
}
