//! Version-aware relabel rule validation.
//!
//! Prometheus grew new relabel actions over time, and relaxed the label name
//! syntax in 3.0.0. A [`RelabelValidator`] is bound to one Prometheus version
//! and rejects rules that version would refuse to load.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use tracing::debug;

use crate::config::{Action, DEFAULT_MODULUS, RelabelConfig};
use crate::error::{RelabelError, Result};

/// Legacy label name syntax.
static LABEL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap_or_else(|_| unreachable!()));

/// First version accepting `lowercase` and `uppercase`.
pub const CASE_ACTIONS_SINCE: Version = Version::new(2, 36, 0);
/// First version accepting `keepequal` and `dropequal`.
pub const EQUAL_ACTIONS_SINCE: Version = Version::new(2, 41, 0);
/// First version accepting UTF-8 label names.
pub const UTF8_NAMES_SINCE: Version = Version::new(3, 0, 0);

/// Validates relabel rules against one Prometheus version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabelValidator {
    version: Version,
}

impl RelabelValidator {
    /// Creates a validator for `version`.
    #[must_use]
    pub const fn new(version: Version) -> Self {
        Self { version }
    }

    /// Creates a validator from a loosely written version such as `v2.36`.
    ///
    /// A leading `v` is dropped and missing minor or patch components are
    /// treated as zero.
    pub fn from_version_str(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (core, suffix) = match stripped.find(['-', '+']) {
            Some(at) => stripped.split_at(at),
            None => (stripped, ""),
        };
        let padded = match core.split('.').count() {
            1 => format!("{core}.0.0{suffix}"),
            2 => format!("{core}.0{suffix}"),
            _ => stripped.to_string(),
        };

        Version::parse(&padded)
            .map(Self::new)
            .map_err(|e| RelabelError::InvalidVersion {
                version: version.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns the Prometheus version rules are checked against.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Returns true if label names may use any UTF-8 characters.
    #[must_use]
    pub fn utf8_names(&self) -> bool {
        self.version >= UTF8_NAMES_SINCE
    }

    /// Validates every rule, reporting the first failure with its position.
    pub fn validate(&self, rules: &[RelabelConfig]) -> Result<()> {
        for (index, rule) in rules.iter().enumerate() {
            self.validate_rule(rule).map_err(|e| RelabelError::Rule {
                index,
                source: Box::new(e),
            })?;
        }

        debug!(version = %self.version, rules = rules.len(), "relabel rules validated");
        Ok(())
    }

    /// Validates a single rule.
    pub fn validate_rule(&self, rule: &RelabelConfig) -> Result<()> {
        let action = rule.parsed_action()?;

        self.check_version(action)?;

        let regex = rule.effective_regex();
        Regex::new(&format!("^(?s:{regex})$")).map_err(|e| RelabelError::InvalidRegex {
            regex: regex.to_string(),
            reason: e.to_string(),
        })?;

        if action == Action::HashMod && rule.modulus == 0 {
            return Err(RelabelError::MissingModulus);
        }

        if action.writes_target() {
            if rule.target_label.is_empty() {
                return Err(RelabelError::MissingTargetLabel { action });
            }
            if !self.is_valid_label(&rule.target_label) {
                return Err(RelabelError::InvalidTargetLabel {
                    label: rule.target_label.clone(),
                    action,
                });
            }
        }

        match action {
            Action::Lowercase | Action::Uppercase => {
                if !rule.replacement_is_default() {
                    return Err(RelabelError::ReplacementNotAllowed { action });
                }
            },
            Action::KeepEqual | Action::DropEqual => {
                if !rule.replacement_is_default() {
                    return Err(RelabelError::ReplacementNotAllowed { action });
                }
                if !rule.regex_is_default()
                    || rule.modulus != DEFAULT_MODULUS
                    || !rule.separator_is_default()
                {
                    return Err(RelabelError::ExtraFields {
                        action,
                        allowed: "'source_labels' and 'target_label'",
                    });
                }
            },
            Action::LabelMap => {
                if let Some(replacement) = rule.replacement.as_deref() {
                    if !replacement.is_empty() && !self.is_valid_label(replacement) {
                        return Err(RelabelError::InvalidReplacement {
                            replacement: replacement.to_string(),
                            action,
                        });
                    }
                }
            },
            Action::LabelKeep | Action::LabelDrop => {
                if !rule.source_labels.is_empty()
                    || !rule.target_label.is_empty()
                    || rule.modulus != DEFAULT_MODULUS
                    || !rule.separator_is_default()
                    || !rule.replacement_is_default()
                {
                    return Err(RelabelError::ExtraFields {
                        action,
                        allowed: "'regex'",
                    });
                }
            },
            Action::Replace | Action::Keep | Action::Drop | Action::HashMod => {},
        }

        Ok(())
    }

    fn check_version(&self, action: Action) -> Result<()> {
        let required = match action {
            Action::Lowercase | Action::Uppercase => CASE_ACTIONS_SINCE,
            Action::KeepEqual | Action::DropEqual => EQUAL_ACTIONS_SINCE,
            _ => return Ok(()),
        };

        if self.version < required {
            return Err(RelabelError::VersionGate {
                action,
                required,
                actual: self.version.clone(),
            });
        }
        Ok(())
    }

    /// Label names holding `$` references are only known after expansion.
    fn is_valid_label(&self, label: &str) -> bool {
        if label.contains('$') {
            return true;
        }
        if self.utf8_names() {
            return !label.is_empty();
        }
        LABEL_NAME.is_match(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(version: &str) -> RelabelValidator {
        RelabelValidator::from_version_str(version).unwrap()
    }

    mod version_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("2.36.0", Version::new(2, 36, 0) ; "plain")]
        #[test_case("v2.41.1", Version::new(2, 41, 1) ; "leading v")]
        #[test_case("v2.36", Version::new(2, 36, 0) ; "missing patch")]
        #[test_case("3", Version::new(3, 0, 0) ; "major only")]
        #[test_case(" 2.45.0 ", Version::new(2, 45, 0) ; "surrounding whitespace")]
        fn parses(input: &str, expected: Version) {
            assert_eq!(at(input).version(), &expected);
        }

        #[test]
        fn keeps_prerelease() {
            let v = at("v2.36-rc.0");
            assert_eq!(v.version().pre.as_str(), "rc.0");
            // A release candidate predates the release.
            assert!(v.version() < &CASE_ACTIONS_SINCE);
        }

        #[test_case("" ; "empty")]
        #[test_case("latest" ; "word")]
        #[test_case("2.x.0" ; "non numeric")]
        fn rejects(input: &str) {
            let err = RelabelValidator::from_version_str(input).unwrap_err();
            assert!(matches!(err, RelabelError::InvalidVersion { .. }));
        }

        #[test]
        fn utf8_names_from_three() {
            assert!(!at("2.55.0").utf8_names());
            assert!(at("3.0.0").utf8_names());
        }
    }

    mod gate_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn uppercase_rejected_before_2_36() {
            let rule = RelabelConfig::new("uppercase").target_label("up");
            let err = at("2.30.0").validate_rule(&rule).unwrap_err();
            assert_eq!(
                err,
                RelabelError::VersionGate {
                    action: Action::Uppercase,
                    required: Version::new(2, 36, 0),
                    actual: Version::new(2, 30, 0),
                }
            );
        }

        #[test]
        fn uppercase_accepted_from_2_36() {
            let rule = RelabelConfig::new("uppercase").target_label("up");
            assert!(at("2.36.0").validate_rule(&rule).is_ok());
        }

        #[test_case("keepequal", "2.40.9", false ; "keepequal too old")]
        #[test_case("keepequal", "2.41.0", true ; "keepequal supported")]
        #[test_case("DropEqual", "2.40.0", false ; "dropequal too old")]
        #[test_case("dropequal", "2.50.0", true ; "dropequal supported")]
        #[test_case("Lowercase", "2.35.1", false ; "lowercase too old")]
        #[test_case("lowercase", "3.1.0", true ; "lowercase supported")]
        fn gated(action: &str, version: &str, ok: bool) {
            let rule = RelabelConfig::new(action).target_label("t");
            assert_eq!(at(version).validate_rule(&rule).is_ok(), ok);
        }

        #[test]
        fn ungated_actions_always_pass() {
            let v = at("2.0.0");
            assert!(v.validate_rule(&RelabelConfig::new("keep")).is_ok());
            assert!(v.validate_rule(&RelabelConfig::new("drop").regex("foo.*")).is_ok());
        }
    }

    mod rule_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn hashmod_needs_modulus() {
            let rule = RelabelConfig::new("hashmod").target_label("shard");
            assert_eq!(
                at("2.45.0").validate_rule(&rule),
                Err(RelabelError::MissingModulus)
            );
            assert!(at("2.45.0").validate_rule(&rule.modulus(4)).is_ok());
        }

        #[test]
        fn bad_regex() {
            let rule = RelabelConfig::new("keep").regex("(unclosed");
            let err = at("2.45.0").validate_rule(&rule).unwrap_err();
            assert!(matches!(err, RelabelError::InvalidRegex { ref regex, .. } if regex == "(unclosed"));
        }

        #[test_case("replace" ; "replace")]
        #[test_case("" ; "default action")]
        #[test_case("lowercase" ; "lowercase")]
        #[test_case("keepequal" ; "keepequal")]
        fn needs_target(action: &str) {
            let err = at("2.45.0")
                .validate_rule(&RelabelConfig::new(action))
                .unwrap_err();
            assert!(matches!(err, RelabelError::MissingTargetLabel { .. }));
        }

        #[test_case("2.45.0", "bad-name", false ; "legacy rejects dash")]
        #[test_case("2.45.0", "1abc", false ; "legacy rejects leading digit")]
        #[test_case("2.45.0", "good_name", true ; "legacy accepts")]
        #[test_case("2.45.0", "${1}_suffix", true ; "reference is deferred")]
        #[test_case("3.0.0", "bad-name", true ; "utf8 accepts dash")]
        #[test_case("3.0.0", "ünïcode", true ; "utf8 accepts unicode")]
        fn target_label_syntax(version: &str, label: &str, ok: bool) {
            let rule = RelabelConfig::new("replace").target_label(label);
            assert_eq!(at(version).validate_rule(&rule).is_ok(), ok);
        }

        #[test]
        fn case_actions_refuse_replacement() {
            let v = at("2.45.0");
            let rule = RelabelConfig::new("lowercase").target_label("t");
            assert!(v.validate_rule(&rule.clone().replacement("$1")).is_ok());
            assert!(v.validate_rule(&rule.clone().replacement("")).is_ok());
            assert_eq!(
                v.validate_rule(&rule.replacement("x")),
                Err(RelabelError::ReplacementNotAllowed {
                    action: Action::Lowercase
                })
            );
        }

        #[test]
        fn equal_actions_refuse_extra_fields() {
            let v = at("2.45.0");
            let rule = RelabelConfig::new("keepequal")
                .source_labels(["a"])
                .target_label("b");
            assert!(v.validate_rule(&rule).is_ok());
            assert!(v.validate_rule(&rule.clone().regex("(.*)").separator(";")).is_ok());

            for bad in [
                rule.clone().regex("x"),
                rule.clone().modulus(2),
                rule.clone().separator(","),
            ] {
                let err = v.validate_rule(&bad).unwrap_err();
                assert!(matches!(err, RelabelError::ExtraFields { .. }), "{err}");
            }
        }

        #[test_case("labelkeep" ; "labelkeep")]
        #[test_case("labeldrop" ; "labeldrop")]
        fn label_filters_accept_only_regex(action: &str) {
            let v = at("2.45.0");
            let rule = RelabelConfig::new(action).regex("tmp_.*");
            assert!(v.validate_rule(&rule).is_ok());

            for bad in [
                rule.clone().source_labels(["a"]),
                rule.clone().target_label("x"),
                rule.clone().modulus(3),
                rule.clone().separator("|"),
                rule.clone().replacement("y"),
            ] {
                let err = v.validate_rule(&bad).unwrap_err();
                assert_eq!(err.to_string(), format!("{action} action requires only 'regex', and no other fields"));
            }
        }

        #[test_case("2.45.0", "new_$1", true ; "reference")]
        #[test_case("2.45.0", "bad-name", false ; "legacy invalid")]
        #[test_case("3.0.0", "bad-name", true ; "utf8")]
        #[test_case("2.45.0", "", true ; "empty")]
        fn labelmap_replacement(version: &str, replacement: &str, ok: bool) {
            let rule = RelabelConfig::new("labelmap")
                .regex("__meta_(.+)")
                .replacement(replacement);
            assert_eq!(at(version).validate_rule(&rule).is_ok(), ok);
        }

        #[test]
        fn unknown_action() {
            let err = at("2.45.0")
                .validate_rule(&RelabelConfig::new("explode"))
                .unwrap_err();
            assert_eq!(err.to_string(), "unknown relabel action \"explode\"");
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn reports_failing_index() {
            let rules = vec![
                RelabelConfig::new("keep").regex("a"),
                RelabelConfig::new("replace").target_label("ok"),
                RelabelConfig::new("hashmod").target_label("shard"),
            ];
            let err = at("2.45.0").validate(&rules).unwrap_err();
            assert!(matches!(err, RelabelError::Rule { index: 2, .. }));
            assert_eq!(err.root_cause(), &RelabelError::MissingModulus);
        }

        #[test]
        fn empty_list_is_valid() {
            assert!(at("2.0.0").validate(&[]).is_ok());
        }
    }

    proptest! {
        #[test]
        fn legacy_names_are_valid_everywhere(label in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
            let rule = RelabelConfig::new("replace").target_label(label);
            prop_assert!(at("2.45.0").validate_rule(&rule).is_ok());
            prop_assert!(at("3.0.0").validate_rule(&rule).is_ok());
        }
    }
}
