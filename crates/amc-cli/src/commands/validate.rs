//! Validate command implementation.

use std::io::Write;

use amc_compose::validate_tenant;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::inputs::load_tenants;
use crate::output::{CheckResult, OutputFormat, ValidationReport};

/// Validate command executor.
pub struct ValidateCommand<'a> {
    args: &'a ValidateArgs,
}

impl<'a> ValidateCommand<'a> {
    /// Create a new validate command.
    #[must_use]
    pub const fn new(args: &'a ValidateArgs) -> Self {
        Self { args }
    }

    /// Execute the validate command.
    ///
    /// Every tenant is reported; the command fails if any is invalid.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let tenants = load_tenants(&self.args.files)?;

        let mut keys: Vec<&String> = tenants.keys().collect();
        keys.sort();

        let mut report = ValidationReport::new("tenant");
        for key in keys {
            let result = match validate_tenant(&tenants[key]) {
                Ok(()) => CheckResult::passed(key.as_str()),
                Err(e) => CheckResult::failed(key.as_str(), e),
            };
            report.results.push(result);
        }

        format.write(writer, &report)?;
        report.into_result()
    }
}
