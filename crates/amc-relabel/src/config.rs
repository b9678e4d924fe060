//! Relabel rule model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelabelError;

/// Regex applied when none is given.
pub const DEFAULT_REGEX: &str = "(.*)";
/// Separator applied when none is given.
pub const DEFAULT_SEPARATOR: &str = ";";
/// Replacement applied when none is given.
pub const DEFAULT_REPLACEMENT: &str = "$1";
/// Modulus applied when none is given.
pub const DEFAULT_MODULUS: u64 = 0;

/// A relabel action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Write the regex replacement into the target label.
    Replace,
    /// Keep targets whose concatenated source labels match.
    Keep,
    /// Drop targets whose concatenated source labels match.
    Drop,
    /// Write a hash of the source labels modulo `modulus`.
    HashMod,
    /// Copy matching label names to the replacement name.
    LabelMap,
    /// Drop labels whose name matches.
    LabelDrop,
    /// Keep only labels whose name matches.
    LabelKeep,
    /// Write the lower-cased source labels.
    Lowercase,
    /// Write the upper-cased source labels.
    Uppercase,
    /// Keep targets whose source labels equal the target label.
    KeepEqual,
    /// Drop targets whose source labels equal the target label.
    DropEqual,
}

impl Action {
    /// Returns the action as written in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::HashMod => "hashmod",
            Self::LabelMap => "labelmap",
            Self::LabelDrop => "labeldrop",
            Self::LabelKeep => "labelkeep",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
            Self::KeepEqual => "keepequal",
            Self::DropEqual => "dropequal",
        }
    }

    /// Returns true if the action writes to `target_label`.
    #[must_use]
    pub const fn writes_target(&self) -> bool {
        matches!(
            self,
            Self::Replace
                | Self::HashMod
                | Self::Lowercase
                | Self::Uppercase
                | Self::KeepEqual
                | Self::DropEqual
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = RelabelError;

    /// Parses an action case-insensitively; the empty string means `replace`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "replace" => Ok(Self::Replace),
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            "hashmod" => Ok(Self::HashMod),
            "labelmap" => Ok(Self::LabelMap),
            "labeldrop" => Ok(Self::LabelDrop),
            "labelkeep" => Ok(Self::LabelKeep),
            "lowercase" => Ok(Self::Lowercase),
            "uppercase" => Ok(Self::Uppercase),
            "keepequal" => Ok(Self::KeepEqual),
            "dropequal" => Ok(Self::DropEqual),
            _ => Err(RelabelError::UnknownAction {
                action: s.to_string(),
            }),
        }
    }
}

/// One relabel rule as written in a monitoring resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelabelConfig {
    /// Labels whose values are concatenated and matched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_labels: Vec<String>,
    /// Separator placed between concatenated values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Label written by the action.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_label: String,
    /// Regex matched against the concatenated values.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex: String,
    /// Modulus for `hashmod`.
    #[serde(skip_serializing_if = "is_zero")]
    pub modulus: u64,
    /// Replacement written by the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Action to perform; empty means `replace`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl RelabelConfig {
    /// Creates a rule for `action` with every other field unset.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Sets the target label.
    #[must_use]
    pub fn target_label(mut self, label: impl Into<String>) -> Self {
        self.target_label = label.into();
        self
    }

    /// Sets the source labels.
    #[must_use]
    pub fn source_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the regex.
    #[must_use]
    pub fn regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    /// Sets the modulus.
    #[must_use]
    pub const fn modulus(mut self, modulus: u64) -> Self {
        self.modulus = modulus;
        self
    }

    /// Sets the separator.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Sets the replacement.
    #[must_use]
    pub fn replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    /// Parses the action.
    pub fn parsed_action(&self) -> Result<Action, RelabelError> {
        self.action.parse()
    }

    /// Returns the regex to compile, falling back to the default.
    #[must_use]
    pub fn effective_regex(&self) -> &str {
        if self.regex.is_empty() {
            DEFAULT_REGEX
        } else {
            &self.regex
        }
    }

    pub(crate) fn regex_is_default(&self) -> bool {
        self.regex.is_empty() || self.regex == DEFAULT_REGEX
    }

    pub(crate) fn separator_is_default(&self) -> bool {
        self.separator
            .as_deref()
            .is_none_or(|s| s.is_empty() || s == DEFAULT_SEPARATOR)
    }

    pub(crate) fn replacement_is_default(&self) -> bool {
        self.replacement
            .as_deref()
            .is_none_or(|r| r.is_empty() || r == DEFAULT_REPLACEMENT)
    }
}
