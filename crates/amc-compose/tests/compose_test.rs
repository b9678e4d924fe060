//! End-to-end composition tests: YAML base in, YAML out.

use std::collections::HashMap;

use amc_compose::{
    AlertmanagerConfig, ComposeError, ConfigComposer, Matcher, PagerDutyConfig, Receiver, Route,
    SecretKeySelector, SecretStore, TenantConfig, TenantSpec, WebhookConfig,
};
use proptest::prelude::*;

const BASE: &str = r#"
global:
  resolve_timeout: 5m
route:
  receiver: "null"
  group_by: [job]
  routes:
  - receiver: ops
    match:
      team: ops
receivers:
- name: "null"
- name: ops
  webhook_configs:
  - url: http://ops.example.com/hook
inhibit_rules:
- source_match:
    severity: critical
  target_match:
    severity: warning
  equal: [alertname]
time_intervals:
- name: offhours
  time_intervals:
  - times:
    - start_time: "18:00"
      end_time: "24:00"
"#;

fn base() -> AlertmanagerConfig {
    AlertmanagerConfig::from_yaml(BASE.as_bytes()).unwrap()
}

fn pagerduty_tenant(namespace: &str, name: &str, receiver: &str) -> TenantConfig {
    let mut r = Receiver::named(receiver);
    r.pagerduty_configs.push(PagerDutyConfig {
        routing_key: Some(SecretKeySelector::new("pd", "key")),
        ..PagerDutyConfig::default()
    });
    TenantConfig::new(
        namespace,
        name,
        TenantSpec {
            route: Some(Route {
                receiver: receiver.to_string(),
                ..Route::default()
            }),
            receivers: vec![r],
            ..TenantSpec::default()
        },
    )
}

fn by_key(list: Vec<TenantConfig>) -> HashMap<String, TenantConfig> {
    list.into_iter().map(|t| (t.key().to_string(), t)).collect()
}

fn secrets_for(namespaces: &[&str]) -> SecretStore {
    namespaces.iter().fold(SecretStore::new(), |store, ns| {
        store.with_secret(*ns, "pd", [("key", format!("{ns}-key"))])
    })
}

#[test]
fn single_tenant_example() {
    let store = secrets_for(&["mynamespace"]);
    let composer = ConfigComposer::new(&store);
    let tenants = by_key(vec![pagerduty_tenant("mynamespace", "myamc", "test")]);

    let yaml = composer.compose(&base(), &tenants).unwrap();
    let out = AlertmanagerConfig::from_yaml(&yaml).unwrap();
    out.check().unwrap();

    let route = out.route.as_ref().unwrap();
    assert_eq!(route.receiver, "null");
    assert_eq!(route.group_by, vec!["job".to_string()]);
    assert_eq!(route.routes.len(), 2);

    let tenant_route = &route.routes[1];
    assert_eq!(tenant_route.receiver, "mynamespace-myamc-test");
    assert!(tenant_route.continue_matching);
    assert_eq!(tenant_route.match_labels.len(), 1);
    assert_eq!(
        tenant_route.match_labels.get("namespace").map(String::as_str),
        Some("mynamespace")
    );
    assert!(tenant_route.match_re.is_empty());

    let receiver = out.receiver("mynamespace-myamc-test").unwrap();
    assert_eq!(
        receiver.pagerduty_configs[0].routing_key.as_deref(),
        Some("mynamespace-key")
    );

    // Base content is carried over untouched.
    assert_eq!(out.inhibit_rules.len(), 1);
    assert!(out.extra.contains_key("time_intervals"));
    assert_eq!(
        out.global.as_ref().and_then(|g| g.resolve_timeout.as_deref()),
        Some("5m")
    );
}

#[test]
fn two_tenants_same_receiver_name() {
    let store = secrets_for(&["a", "b"]);
    let composer = ConfigComposer::new(&store);
    let tenants = by_key(vec![
        pagerduty_tenant("b", "b", "x"),
        pagerduty_tenant("a", "a", "x"),
    ]);

    let out = AlertmanagerConfig::from_yaml(&composer.compose(&base(), &tenants).unwrap()).unwrap();
    let routes = &out.route.as_ref().unwrap().routes;
    let order: Vec<_> = routes.iter().map(|r| r.receiver.as_str()).collect();
    assert_eq!(order, vec!["ops", "a-a-x", "b-b-x"]);

    assert_eq!(
        out.receiver("a-a-x").unwrap().pagerduty_configs[0].routing_key.as_deref(),
        Some("a-key")
    );
    assert_eq!(
        out.receiver("b-b-x").unwrap().pagerduty_configs[0].routing_key.as_deref(),
        Some("b-key")
    );
}

#[test]
fn namespace_override_cannot_escape() {
    let store = secrets_for(&["team"]);
    let mut tenant = pagerduty_tenant("team", "amc", "x");
    if let Some(route) = tenant.spec.route.as_mut() {
        route.matchers = vec![
            Matcher::regex("namespace", ".*"),
            Matcher::equal("namespace", "kube-system"),
        ];
        route.continue_matching = false;
    }

    let composer = ConfigComposer::new(&store);
    let yaml = composer.compose(&base(), &by_key(vec![tenant])).unwrap();
    let text = String::from_utf8(yaml.clone()).unwrap();
    assert!(!text.contains("match_re"));
    assert!(!text.contains("kube-system"));

    let out = AlertmanagerConfig::from_yaml(&yaml).unwrap();
    let tenant_route = &out.route.as_ref().unwrap().routes[1];
    assert_eq!(
        tenant_route.match_labels.get("namespace").map(String::as_str),
        Some("team")
    );
    assert!(tenant_route.continue_matching);
}

#[test]
fn duplicate_receiver_is_rejected() {
    let store = secrets_for(&["ns"]);
    let mut tenant = pagerduty_tenant("ns", "amc", "dup");
    tenant.spec.receivers.push(Receiver::named("dup"));

    let composer = ConfigComposer::new(&store);
    let err = composer.compose(&base(), &by_key(vec![tenant])).unwrap_err();
    assert!(matches!(err, ComposeError::Validation { .. }));
    assert!(err.to_string().contains("\"dup\""));
}

#[test]
fn webhook_url_secret_is_inlined() {
    let store = SecretStore::new().with_secret("ns", "hook", [("url", "http://hidden.example.com")]);
    let mut r = Receiver::named("hook");
    r.webhook_configs.push(WebhookConfig {
        url_secret: Some(SecretKeySelector::new("hook", "url")),
        ..WebhookConfig::default()
    });
    let tenant = TenantConfig::new(
        "ns",
        "amc",
        TenantSpec {
            route: Some(Route {
                receiver: "hook".to_string(),
                ..Route::default()
            }),
            receivers: vec![r],
            ..TenantSpec::default()
        },
    );

    let composer = ConfigComposer::new(&store);
    let yaml = composer.compose(&base(), &by_key(vec![tenant])).unwrap();
    assert!(!String::from_utf8_lossy(&yaml).contains("urlSecret"));

    let out = AlertmanagerConfig::from_yaml(&yaml).unwrap();
    let hook = &out.receiver("ns-amc-hook").unwrap().webhook_configs[0];
    assert_eq!(hook.url.as_deref(), Some("http://hidden.example.com"));
}

#[test]
fn output_is_deterministic() {
    let namespaces = ["zeta", "alpha", "mid", "beta"];
    let store = secrets_for(&namespaces);
    let composer = ConfigComposer::new(&store);

    let first = composer
        .compose(
            &base(),
            &by_key(namespaces.iter().map(|ns| pagerduty_tenant(ns, "amc", "r")).collect()),
        )
        .unwrap();
    for _ in 0..5 {
        let again = composer
            .compose(
                &base(),
                &by_key(namespaces.iter().rev().map(|ns| pagerduty_tenant(ns, "amc", "r")).collect()),
            )
            .unwrap();
        assert_eq!(first, again);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_tenant_root_is_isolated(namespaces in prop::collection::btree_set("[a-z][a-z0-9]{0,6}", 1..6)) {
        let list: Vec<&str> = namespaces.iter().map(String::as_str).collect();
        let store = secrets_for(&list);
        let composer = ConfigComposer::new(&store);
        let tenants = by_key(list.iter().map(|ns| pagerduty_tenant(ns, "amc", "r")).collect());

        let composition = composer.build(&base(), &tenants).unwrap();
        let routes = &composition.config.route.as_ref().unwrap().routes;
        prop_assert_eq!(routes.len(), list.len() + 1);

        for (route, ns) in routes[1..].iter().zip(namespaces.iter()) {
            prop_assert_eq!(route.match_labels.get("namespace"), Some(ns));
            prop_assert!(!route.match_re.contains_key("namespace"));
            prop_assert!(route.continue_matching);
            prop_assert_eq!(&route.receiver, &format!("{ns}-amc-r"));
        }

        let yaml = composition.to_yaml().unwrap();
        let reparsed = AlertmanagerConfig::from_yaml(&yaml).unwrap();
        prop_assert!(reparsed.check().is_ok());
    }
}
