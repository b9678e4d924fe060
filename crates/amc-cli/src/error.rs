//! CLI error types.

use std::fmt;
use std::path::PathBuf;

use amc_compose::ComposeError;
use amc_relabel::RelabelError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// An input file could not be read or parsed.
    Input {
        /// The file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
    /// Composition failed.
    Compose(ComposeError),
    /// Relabel rules could not be checked.
    Relabel(RelabelError),
    /// Some inputs did not pass validation.
    Invalid {
        /// Number of failing items.
        failed: usize,
        /// Number of items checked.
        total: usize,
    },
    /// Invalid argument.
    InvalidArgument(String),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl CliError {
    /// Creates an input error for `path`.
    pub fn input(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { path, reason } => write!(f, "{}: {reason}", path.display()),
            Self::Compose(e) => write!(f, "composition failed: {e}"),
            Self::Relabel(e) => write!(f, "relabel error: {e}"),
            Self::Invalid { failed, total } => write!(f, "{failed} of {total} failed validation"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compose(e) => Some(e),
            Self::Relabel(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ComposeError> for CliError {
    fn from(err: ComposeError) -> Self {
        Self::Compose(err)
    }
}

impl From<RelabelError> for CliError {
    fn from(err: RelabelError) -> Self {
        Self::Relabel(err)
    }
}
