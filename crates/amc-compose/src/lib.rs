//! Multi-tenant Alertmanager configuration composition.
//!
//! `amc-compose` merges an operator-authored base Alertmanager configuration
//! with any number of namespace-scoped partial configurations (tenants) into
//! a single Alertmanager YAML document.
//!
//! # Guarantees
//!
//! - **Isolation**: every tenant root route matches `namespace=<tenant namespace>`
//!   and cannot override it, and always continues evaluation
//! - **Naming**: tenant receivers and time intervals are renamed
//!   `<namespace>-<name>-<receiver>`
//! - **Ordering**: base routes come first, then tenants in key order
//! - **Secrets**: selectors are resolved at composition time; TLS material is
//!   referenced by a deterministic file path
//! - **Determinism**: identical inputs produce byte-identical output
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use amc_compose::{
//!     AlertmanagerConfig, ConfigComposer, PagerDutyConfig, Receiver, Route, SecretKeySelector,
//!     SecretStore, TenantConfig, TenantSpec,
//! };
//!
//! let base = AlertmanagerConfig::from_yaml(
//!     b"route:\n  receiver: 'null'\nreceivers:\n- name: 'null'\n",
//! )
//! .unwrap();
//!
//! let mut receiver = Receiver::named("test");
//! receiver.pagerduty_configs.push(PagerDutyConfig {
//!     routing_key: Some(SecretKeySelector::new("pd", "key")),
//!     ..PagerDutyConfig::default()
//! });
//!
//! let tenant = TenantConfig::new(
//!     "mynamespace",
//!     "myamc",
//!     TenantSpec {
//!         route: Some(Route { receiver: "test".to_string(), ..Route::default() }),
//!         receivers: vec![receiver],
//!         ..TenantSpec::default()
//!     },
//! );
//!
//! let secrets = SecretStore::new().with_secret("mynamespace", "pd", [("key", "s3cr3t")]);
//! let composer = ConfigComposer::new(&secrets);
//!
//! let tenants = HashMap::from([("mynamespace/myamc".to_string(), tenant)]);
//! let yaml = String::from_utf8(composer.compose(&base, &tenants).unwrap()).unwrap();
//!
//! assert!(yaml.contains("mynamespace-myamc-test"));
//! assert!(yaml.contains("routing_key: s3cr3t"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alertmanager;
pub mod composer;
pub mod duration;
pub mod error;
pub mod inhibit;
pub mod intervals;
pub mod receivers;
pub mod routes;
pub mod secrets;
pub mod tenant;
pub mod validation;

// Re-export main types at crate root
pub use alertmanager::AlertmanagerConfig;
pub use composer::{
    ComposerConfig, Composition, ConfigComposer, DEFAULT_TLS_ASSETS_DIR, RejectedTenant,
    TenantSelection,
};
pub use duration::{parse_duration, InvalidDuration};
pub use error::{ComposeError, FieldPath, Result, SecretError, ValidationError};
pub use inhibit::convert_inhibit_rule;
pub use intervals::{check_time_interval, convert_time_interval};
pub use receivers::{CompiledIntegration, Integration, IntegrationKind, ReceiverCompiler};
pub use routes::{
    convert_route, enforce_namespace, namespaced_name, MatcherStrategy, NAMESPACE_LABEL,
};
pub use secrets::{SecretResolver, SecretStore, TlsAssetKey, TlsAssetSource};
pub use tenant::{
    BasicAuth, ConfigMapKeySelector, EmailConfig, HttpConfig, InhibitRule, KeyValue, Matcher,
    OpsGenieConfig, OpsGenieConfigResponder, PagerDutyConfig, PagerDutyImageConfig,
    PagerDutyLinkConfig, PushoverConfig, Receiver, Route, SafeTlsConfig, SecretKeySelector,
    DayOfMonthRange, SecretOrConfigMap, SlackAction, SlackConfig, SlackConfirmationField,
    SlackField, TenantConfig, TenantKey, TenantSpec, TimeInterval, TimePeriod, TimeRange,
    VictorOpsConfig, WeChatConfig, WebhookConfig,
};
pub use validation::{validate_tenant, Validate};
