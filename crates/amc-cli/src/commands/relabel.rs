//! Relabel command implementation.

use std::io::Write;

use amc_relabel::RelabelValidator;

use crate::cli::RelabelArgs;
use crate::error::CliError;
use crate::inputs::load_relabel_rules;
use crate::output::{CheckResult, OutputFormat, ValidationReport};

/// Relabel command executor.
pub struct RelabelCommand<'a> {
    args: &'a RelabelArgs,
}

impl<'a> RelabelCommand<'a> {
    /// Create a new relabel command.
    #[must_use]
    pub const fn new(args: &'a RelabelArgs) -> Self {
        Self { args }
    }

    /// Execute the relabel command.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let validator = RelabelValidator::from_version_str(&self.args.prometheus_version)?;
        let rules = load_relabel_rules(&self.args.file)?;

        let mut report = ValidationReport::new("rule");
        report.prometheus_version = Some(validator.version().to_string());

        for (index, rule) in rules.iter().enumerate() {
            let action = if rule.action.is_empty() { "replace" } else { rule.action.as_str() };
            let subject = format!("{index} ({action})");
            let result = match validator.validate_rule(rule) {
                Ok(()) => CheckResult::passed(subject),
                Err(e) => CheckResult::failed(subject, e),
            };
            report.results.push(result);
        }

        format.write(writer, &report)?;
        report.into_result()
    }
}
