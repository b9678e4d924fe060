//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a report to the output.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            },
            Format::Table => {
                value.write_table(writer)?;
            },
        }
        Ok(())
    }

    /// Write a report to a string.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Outcome of checking one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// What was checked: a tenant key or a rule position.
    pub subject: String,
    /// Whether the item passed.
    pub valid: bool,
    /// Why it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// A passing item.
    #[must_use]
    pub fn passed(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            valid: true,
            error: None,
        }
    }

    /// A failing item.
    #[must_use]
    pub fn failed(subject: impl Into<String>, error: impl ToString) -> Self {
        Self {
            subject: subject.into(),
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Per-item validation report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// What kind of items were checked.
    pub kind: String,
    /// Prometheus version, for relabel reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus_version: Option<String>,
    /// One entry per item, in input order.
    pub results: Vec<CheckResult>,
}

impl ValidationReport {
    /// Creates an empty report for `kind` items.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Number of failing items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.valid).count()
    }

    /// Fails with [`CliError::Invalid`] if any item failed.
    pub fn into_result(self) -> Result<(), CliError> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(CliError::Invalid {
                failed,
                total: self.results.len(),
            }),
        }
    }
}

impl TableDisplay for ValidationReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if let Some(version) = &self.prometheus_version {
            writeln!(writer, "Prometheus version: {version}")?;
            writeln!(writer)?;
        }

        let width = self
            .results
            .iter()
            .map(|r| r.subject.len())
            .max()
            .unwrap_or(0)
            .max(self.kind.len());

        writeln!(writer, "{:<width$}  STATUS   ERROR", self.kind.to_uppercase())?;
        for result in &self.results {
            let status = if result.valid { "ok" } else { "invalid" };
            writeln!(
                writer,
                "{:<width$}  {status:<7}  {}",
                result.subject,
                result.error.as_deref().unwrap_or("-"),
            )?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "{} checked, {} invalid",
            self.results.len(),
            self.failed()
        )?;
        Ok(())
    }
}

/// Summary of a composition written to a file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposeSummary {
    /// Where the configuration was written.
    pub output: String,
    /// Tenants merged, in output order.
    pub tenants: Vec<String>,
    /// Total receivers in the composed configuration.
    pub receivers: usize,
    /// Tenants dropped with `--skip-invalid`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<CheckResult>,
    /// TLS asset file paths referenced by the configuration.
    pub tls_assets: Vec<String>,
}

impl TableDisplay for ComposeSummary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Composed Configuration")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Output:      {}", self.output)?;
        writeln!(writer, "Tenants:     {}", self.tenants.len())?;
        writeln!(writer, "Receivers:   {}", self.receivers)?;
        writeln!(writer, "TLS assets:  {}", self.tls_assets.len())?;

        if !self.tenants.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Merged")?;
            for tenant in &self.tenants {
                writeln!(writer, "  {tenant}")?;
            }
        }

        if !self.rejected.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Skipped")?;
            for rejected in &self.rejected {
                writeln!(
                    writer,
                    "  {}: {}",
                    rejected.subject,
                    rejected.error.as_deref().unwrap_or("-")
                )?;
            }
        }

        if !self.tls_assets.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "TLS assets")?;
            for path in &self.tls_assets {
                writeln!(writer, "  {path}")?;
            }
        }
        Ok(())
    }
}
