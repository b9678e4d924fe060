//! Error types for the amc-relabel crate.

use semver::Version;
use thiserror::Error;

use crate::config::Action;

/// Reasons a relabel rule is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelabelError {
    /// The action is newer than the target Prometheus version.
    #[error("{action} relabel action is only supported from Prometheus version {required} (got {actual})")]
    VersionGate {
        /// The gated action.
        action: Action,
        /// First version supporting it.
        required: Version,
        /// The version validated against.
        actual: Version,
    },

    /// The regex does not compile.
    #[error("invalid regex {regex:?} for relabel configuration: {reason}")]
    InvalidRegex {
        /// The offending regex.
        regex: String,
        /// Compiler message.
        reason: String,
    },

    /// `hashmod` without a modulus.
    #[error("relabel configuration for hashmod requires non-zero modulus")]
    MissingModulus,

    /// The action writes a label but none is named.
    #[error("relabel configuration for {action} action needs targetLabel value")]
    MissingTargetLabel {
        /// The action.
        action: Action,
    },

    /// The target label is not a valid label name.
    #[error("{label:?} is invalid 'target_label' for {action} action")]
    InvalidTargetLabel {
        /// The offending label.
        label: String,
        /// The action.
        action: Action,
    },

    /// The action does not take a replacement.
    #[error("'replacement' can not be set for {action} action")]
    ReplacementNotAllowed {
        /// The action.
        action: Action,
    },

    /// The replacement is not a valid label name.
    #[error("{replacement:?} is invalid 'replacement' for {action} action")]
    InvalidReplacement {
        /// The offending replacement.
        replacement: String,
        /// The action.
        action: Action,
    },

    /// The action only accepts a subset of the fields.
    #[error("{action} action requires only {allowed}, and no other fields")]
    ExtraFields {
        /// The action.
        action: Action,
        /// The accepted fields.
        allowed: &'static str,
    },

    /// The action is not known.
    #[error("unknown relabel action {action:?}")]
    UnknownAction {
        /// The action as written.
        action: String,
    },

    /// The Prometheus version does not parse.
    #[error("invalid Prometheus version {version:?}: {reason}")]
    InvalidVersion {
        /// The version as written.
        version: String,
        /// Parser message.
        reason: String,
    },

    /// A rule in a list failed.
    #[error("relabel rule {index}: {source}")]
    Rule {
        /// Position of the rule.
        index: usize,
        /// What was wrong with it.
        #[source]
        source: Box<RelabelError>,
    },
}

impl RelabelError {
    /// Returns the innermost error, unwrapping rule positions.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Rule { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for relabel validation.
pub type Result<T> = std::result::Result<T, RelabelError>;
