//! Route tree conversion with namespace isolation.

use std::collections::BTreeMap;

use crate::alertmanager as am;
use crate::tenant::{Matcher, Route, TenantKey};

/// Label injected into every tenant root route and inhibition rule.
pub const NAMESPACE_LABEL: &str = "namespace";

/// Prefixes a tenant-local name with the tenant identity.
///
/// Empty names stay empty so that routes without a receiver inherit their
/// parent's.
#[must_use]
pub fn namespaced_name(tenant: &TenantKey, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    format!("{}-{}-{}", tenant.namespace, tenant.name, name)
}

/// Splits matchers into exact and regex maps. Later matchers on the same
/// label overwrite earlier ones.
pub(crate) fn partition_matchers(
    matchers: &[Matcher],
) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut exact = BTreeMap::new();
    let mut regex = BTreeMap::new();
    for m in matchers {
        let target = if m.regex { &mut regex } else { &mut exact };
        target.insert(m.name.clone(), m.value.clone());
    }
    (exact, regex)
}

/// Forces `namespace == tenant.namespace` and drops any regex override.
pub fn enforce_namespace(
    tenant: &TenantKey,
    exact: &mut BTreeMap<String, String>,
    regex: &mut BTreeMap<String, String>,
) {
    exact.insert(NAMESPACE_LABEL.to_string(), tenant.namespace.clone());
    regex.remove(NAMESPACE_LABEL);
}

/// How tenant routes and inhibition rules are confined to the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherStrategy {
    /// Add a `namespace` matcher for the tenant namespace.
    #[default]
    OnNamespace,
    /// Leave matchers untouched.
    None,
}

impl MatcherStrategy {
    /// Returns the strategy name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnNamespace => "OnNamespace",
            Self::None => "None",
        }
    }

    pub(crate) fn confine(
        self,
        tenant: &TenantKey,
        exact: &mut BTreeMap<String, String>,
        regex: &mut BTreeMap<String, String>,
    ) {
        if self == Self::OnNamespace {
            enforce_namespace(tenant, exact, regex);
        }
    }
}

impl std::fmt::Display for MatcherStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a tenant route into an upstream route.
///
/// The root of a tenant tree always continues evaluation and, under
/// [`MatcherStrategy::OnNamespace`], only matches alerts from the tenant
/// namespace. Children are converted in order and left unrestricted, since
/// their parent already is. Time interval references get the same prefix as
/// the intervals themselves.
#[must_use]
pub fn convert_route(
    route: &Route,
    tenant: &TenantKey,
    strategy: MatcherStrategy,
    is_root: bool,
) -> am::Route {
    let (mut match_labels, mut match_re) = partition_matchers(&route.matchers);
    if is_root {
        strategy.confine(tenant, &mut match_labels, &mut match_re);
    }
    let prefixed = |names: &[String]| -> Vec<String> {
        names.iter().map(|name| namespaced_name(tenant, name)).collect()
    };

    am::Route {
        receiver: namespaced_name(tenant, &route.receiver),
        group_by: route.group_by.clone(),
        match_labels,
        match_re,
        continue_matching: is_root || route.continue_matching,
        routes: route
            .routes
            .iter()
            .map(|child| convert_route(child, tenant, strategy, false))
            .collect(),
        group_wait: route.group_wait.clone(),
        group_interval: route.group_interval.clone(),
        repeat_interval: route.repeat_interval.clone(),
        mute_time_intervals: prefixed(&route.mute_time_intervals),
        active_time_intervals: prefixed(&route.active_time_intervals),
        extra: am::Extra::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tenant() -> TenantKey {
        TenantKey::new("mynamespace", "myamc")
    }

    fn leaf(receiver: &str, matchers: Vec<Matcher>) -> Route {
        Route {
            receiver: receiver.to_string(),
            matchers,
            ..Route::default()
        }
    }

    mod naming_tests {
        use super::*;

        #[test]
        fn prefixes_namespace_and_name() {
            assert_eq!(namespaced_name(&tenant(), "test"), "mynamespace-myamc-test");
        }

        #[test]
        fn empty_stays_empty() {
            assert_eq!(namespaced_name(&tenant(), ""), "");
        }
    }

    mod root_tests {
        use super::*;

        #[test]
        fn root_gets_namespace_and_continue() {
            let out = convert_route(&leaf("test", vec![]), &tenant(), MatcherStrategy::OnNamespace, true);
            assert_eq!(out.receiver, "mynamespace-myamc-test");
            assert!(out.continue_matching);
            assert_eq!(
                out.match_labels,
                BTreeMap::from([("namespace".to_string(), "mynamespace".to_string())])
            );
            assert!(out.match_re.is_empty());
        }

        #[test]
        fn root_continue_is_forced_even_when_false() {
            let mut route = leaf("test", vec![]);
            route.continue_matching = false;
            assert!(convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true).continue_matching);
        }

        #[test]
        fn exact_namespace_override_is_replaced() {
            let route = leaf("test", vec![Matcher::equal("namespace", "kube-system")]);
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            assert_eq!(out.match_labels.get("namespace").map(String::as_str), Some("mynamespace"));
        }

        #[test]
        fn regex_namespace_override_is_removed() {
            let route = leaf(
                "test",
                vec![Matcher::regex("namespace", ".*"), Matcher::regex("job", "api-.*")],
            );
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            assert!(!out.match_re.contains_key("namespace"));
            assert_eq!(out.match_re.get("job").map(String::as_str), Some("api-.*"));
            assert_eq!(out.match_labels.get("namespace").map(String::as_str), Some("mynamespace"));
        }

        #[test]
        fn later_matcher_wins() {
            let route = leaf(
                "test",
                vec![Matcher::equal("severity", "warning"), Matcher::equal("severity", "critical")],
            );
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            assert_eq!(out.match_labels.get("severity").map(String::as_str), Some("critical"));
        }

        #[test]
        fn timings_and_group_by_are_copied() {
            let route = Route {
                receiver: "test".to_string(),
                group_by: vec!["alertname".to_string(), "job".to_string()],
                group_wait: "30s".to_string(),
                group_interval: "5m".to_string(),
                repeat_interval: "4h".to_string(),
                ..Route::default()
            };
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            assert_eq!(out.group_by, vec!["alertname".to_string(), "job".to_string()]);
            assert_eq!(out.group_wait, "30s");
            assert_eq!(out.group_interval, "5m");
            assert_eq!(out.repeat_interval, "4h");
        }
    }

    mod child_tests {
        use super::*;

        #[test]
        fn children_keep_order_and_are_not_restricted() {
            let route = Route {
                receiver: "test".to_string(),
                routes: vec![
                    leaf("first", vec![Matcher::equal("team", "a")]),
                    leaf("", vec![Matcher::regex("team", "b|c")]),
                    leaf("third", vec![]),
                ],
                ..Route::default()
            };
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            let receivers: Vec<_> = out.routes.iter().map(|r| r.receiver.as_str()).collect();
            assert_eq!(receivers, vec!["mynamespace-myamc-first", "", "mynamespace-myamc-third"]);

            for child in &out.routes {
                assert!(!child.match_labels.contains_key("namespace"));
                assert!(!child.continue_matching);
            }
            assert_eq!(out.routes[1].match_re.get("team").map(String::as_str), Some("b|c"));
        }

        #[test]
        fn child_continue_is_preserved() {
            let mut child = leaf("c", vec![]);
            child.continue_matching = true;
            let route = Route {
                receiver: "test".to_string(),
                routes: vec![child],
                ..Route::default()
            };
            assert!(convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true).routes[0].continue_matching);
        }

        #[test]
        fn deep_trees_are_converted() {
            let mut route = leaf("r0", vec![]);
            for i in 1..20 {
                route = Route {
                    receiver: format!("r{i}"),
                    routes: vec![route],
                    ..Route::default()
                };
            }
            let mut node = &convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            let mut depth = 0;
            while let Some(child) = node.routes.first() {
                node = child;
                depth += 1;
            }
            assert_eq!(depth, 19);
            assert_eq!(node.receiver, "mynamespace-myamc-r0");
        }
    }

    mod strategy_tests {
        use super::*;

        #[test]
        fn none_leaves_matchers_alone() {
            let route = leaf("test", vec![Matcher::regex("namespace", "prod-.*")]);
            let out = convert_route(&route, &tenant(), MatcherStrategy::None, true);
            assert!(out.match_labels.is_empty());
            assert_eq!(out.match_re.get("namespace").map(String::as_str), Some("prod-.*"));
        }

        #[test]
        fn none_still_forces_continue_on_root() {
            let route = Route {
                receiver: "test".to_string(),
                routes: vec![leaf("child", vec![])],
                ..Route::default()
            };
            let out = convert_route(&route, &tenant(), MatcherStrategy::None, true);
            assert!(out.continue_matching);
            assert!(!out.routes[0].continue_matching);
            assert_eq!(out.receiver, "mynamespace-myamc-test");
        }

        #[test]
        fn default_is_on_namespace() {
            assert_eq!(MatcherStrategy::default(), MatcherStrategy::OnNamespace);
            assert_eq!(MatcherStrategy::None.to_string(), "None");
        }
    }

    mod interval_tests {
        use super::*;

        #[test]
        fn interval_references_are_prefixed() {
            let route = Route {
                receiver: "test".to_string(),
                routes: vec![Route {
                    mute_time_intervals: vec!["weekend".to_string()],
                    active_time_intervals: vec!["office".to_string(), "oncall".to_string()],
                    ..Route::default()
                }],
                ..Route::default()
            };
            let out = convert_route(&route, &tenant(), MatcherStrategy::OnNamespace, true);
            assert!(out.mute_time_intervals.is_empty());
            assert_eq!(out.routes[0].mute_time_intervals, vec!["mynamespace-myamc-weekend".to_string()]);
            assert_eq!(
                out.routes[0].active_time_intervals,
                vec!["mynamespace-myamc-office".to_string(), "mynamespace-myamc-oncall".to_string()]
            );
        }
    }

    fn matcher_strategy() -> impl Strategy<Value = Matcher> {
        (
            prop_oneof![Just("namespace".to_string()), "[a-z]{1,8}"],
            "[a-z0-9.*|-]{0,12}",
            any::<bool>(),
        )
            .prop_map(|(name, value, regex)| Matcher { name, value, regex })
    }

    proptest! {
        #[test]
        fn root_is_always_confined_to_namespace(
            namespace in "[a-z][a-z0-9-]{0,15}",
            matchers in prop::collection::vec(matcher_strategy(), 0..8),
            continue_matching in any::<bool>(),
        ) {
            let key = TenantKey::new(namespace.clone(), "amc");
            let route = Route {
                receiver: "r".to_string(),
                matchers,
                continue_matching,
                ..Route::default()
            };
            let out = convert_route(&route, &key, MatcherStrategy::OnNamespace, true);
            prop_assert_eq!(out.match_labels.get(NAMESPACE_LABEL), Some(&namespace));
            prop_assert!(!out.match_re.contains_key(NAMESPACE_LABEL));
            prop_assert!(out.continue_matching);
        }
    }
}
