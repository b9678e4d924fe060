//! Tenant-side input model.
//!
//! These types mirror the `AlertmanagerConfig` custom resource as it is
//! decoded from the Kubernetes API: camelCase field names, optional scalars,
//! secrets referenced through [`SecretKeySelector`]s rather than inlined.
//!
//! - [`TenantConfig`]: one custom resource (metadata + spec)
//! - [`TenantKey`]: the `(namespace, name)` identity of a tenant
//! - [`TenantSpec`]: the partial alerting configuration
//! - [`Route`], [`Matcher`], [`Receiver`], [`InhibitRule`]: spec contents
//! - [`TimeInterval`]: named periods routes can be muted or activated on

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a tenant: the namespace and name of its custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantKey {
    /// Namespace the resource lives in.
    pub namespace: String,
    /// Name of the resource.
    pub name: String,
}

impl TenantKey {
    /// Creates a new tenant key.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// One namespace-scoped partial alerting configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Identity of the resource.
    pub metadata: TenantKey,
    /// The partial configuration.
    #[serde(default)]
    pub spec: TenantSpec,
}

impl TenantConfig {
    /// Creates a tenant from its identity and spec.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: TenantSpec) -> Self {
        Self {
            metadata: TenantKey::new(namespace, name),
            spec,
        }
    }

    /// Returns the tenant identity.
    #[must_use]
    pub const fn key(&self) -> &TenantKey {
        &self.metadata
    }
}

/// The body of a tenant configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    /// Root of the tenant's routing tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// Receivers referenced by the routing tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<Receiver>,
    /// Inhibition rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inhibit_rules: Vec<InhibitRule>,
    /// Named time intervals routes can mute or activate on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mute_time_intervals: Vec<TimeInterval>,
}

/// A node of the tenant routing tree. Each node owns its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Route {
    /// Name of the receiver for this route.
    pub receiver: String,
    /// Labels to group alerts by.
    pub group_by: Vec<String>,
    /// How long to wait before sending the first notification of a group.
    pub group_wait: String,
    /// How long to wait before sending an updated notification.
    pub group_interval: String,
    /// How long to wait before repeating the last notification.
    pub repeat_interval: String,
    /// Label matchers an alert has to fulfill to match this node.
    pub matchers: Vec<Matcher>,
    /// Whether evaluation continues with sibling nodes after a match.
    #[serde(rename = "continue")]
    pub continue_matching: bool,
    /// Child routes.
    pub routes: Vec<Route>,
    /// Time intervals during which the route is muted.
    pub mute_time_intervals: Vec<String>,
    /// Time intervals during which the route is active.
    pub active_time_intervals: Vec<String>,
}

/// A named set of time periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeInterval {
    /// Name routes refer to.
    pub name: String,
    /// The periods; the interval matches when any of them does.
    pub time_intervals: Vec<TimePeriod>,
}

impl TimeInterval {
    /// Creates an interval from its periods.
    #[must_use]
    pub fn new(name: impl Into<String>, time_intervals: Vec<TimePeriod>) -> Self {
        Self {
            name: name.into(),
            time_intervals,
        }
    }
}

/// A period of time. Unset fields match any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimePeriod {
    /// Ranges of the day, `HH:MM` in 24 hour format.
    pub times: Vec<TimeRange>,
    /// Days of the week, e.g. `monday` or `monday:friday`.
    pub weekdays: Vec<String>,
    /// Days of the month; negative values count from the end of the month.
    pub days_of_month: Vec<DayOfMonthRange>,
    /// Months by name or number, e.g. `january:march` or `1:3`.
    pub months: Vec<String>,
    /// Years, e.g. `2030` or `2030:2050`.
    pub years: Vec<String>,
}

/// A range of the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeRange {
    /// Start of the range, inclusive.
    pub start_time: String,
    /// End of the range, exclusive.
    pub end_time: String,
}

impl TimeRange {
    /// Creates a range.
    #[must_use]
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// An inclusive range of days of the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayOfMonthRange {
    /// First day.
    pub start: i32,
    /// Last day.
    pub end: i32,
}

/// A `(name, value, regex)` label matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    /// Label to match.
    pub name: String,
    /// Label value to match.
    pub value: String,
    /// Whether `value` is a regular expression.
    #[serde(default)]
    pub regex: bool,
}

impl Matcher {
    /// Creates an exact-match matcher.
    #[must_use]
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            regex: false,
        }
    }

    /// Creates a regex matcher.
    #[must_use]
    pub fn regex(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            regex: true,
        }
    }
}

/// Inhibition rule: mutes target alerts while a matching source alert fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InhibitRule {
    /// Matchers that have to be fulfilled in the alerts to be muted.
    pub target_match: Vec<Matcher>,
    /// Matchers for which one or more alerts have to exist for the inhibition to take effect.
    pub source_match: Vec<Matcher>,
    /// Labels that must have an equal value in the source and target alert.
    pub equal: Vec<String>,
}

/// Reference to a key of a secret in the tenant's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Name of the secret.
    pub name: String,
    /// Key within the secret.
    pub key: String,
}

impl SecretKeySelector {
    /// Creates a selector.
    #[must_use]
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Reference to a key of a configmap in the tenant's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigMapKeySelector {
    /// Name of the configmap.
    pub name: String,
    /// Key within the configmap.
    pub key: String,
}

/// Data held either in a secret or in a configmap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretOrConfigMap {
    /// Secret holding the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretKeySelector>,
    /// Configmap holding the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapKeySelector>,
}

impl SecretOrConfigMap {
    /// Selects a secret key.
    #[must_use]
    pub fn secret(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            secret: Some(SecretKeySelector::new(name, key)),
            config_map: None,
        }
    }

    /// Selects a configmap key.
    #[must_use]
    pub fn config_map(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            secret: None,
            config_map: Some(ConfigMapKeySelector {
                name: name.into(),
                key: key.into(),
            }),
        }
    }

    /// Returns true if neither source is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.secret.is_none() && self.config_map.is_none()
    }
}

impl fmt::Display for SecretOrConfigMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.secret, &self.config_map) {
            (Some(s), _) => write!(f, "<secret={},key={}>", s.name, s.key),
            (None, Some(c)) => write!(f, "<configmap={},key={}>", c.name, c.key),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

/// TLS settings that only reference material through selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeTlsConfig {
    /// Certificate authority used when verifying server certificates.
    pub ca: SecretOrConfigMap,
    /// Client certificate to present.
    pub cert: SecretOrConfigMap,
    /// Secret holding the client key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<SecretKeySelector>,
    /// Server name used to verify the hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Disable certificate validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_skip_verify: Option<bool>,
}

/// Basic authentication credentials, both held in secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuth {
    /// Secret key holding the username.
    pub username: SecretKeySelector,
    /// Secret key holding the password.
    pub password: SecretKeySelector,
}

/// HTTP client settings of an integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Basic authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    /// Secret key holding a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token_secret: Option<SecretKeySelector>,
    /// TLS settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<SafeTlsConfig>,
    /// Proxy URL.
    #[serde(rename = "proxyURL", skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

/// A key/value pair; lists of these become maps in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Key of the tuple.
    pub key: String,
    /// Value of the tuple.
    pub value: String,
}

impl KeyValue {
    /// Creates a key/value pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named set of notification integrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Receiver {
    /// Name of the receiver, unique within the tenant.
    pub name: String,
    /// OpsGenie integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opsgenie_configs: Vec<OpsGenieConfig>,
    /// PagerDuty integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pagerduty_configs: Vec<PagerDutyConfig>,
    /// Slack integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slack_configs: Vec<SlackConfig>,
    /// Webhook integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub webhook_configs: Vec<WebhookConfig>,
    /// WeChat integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wechat_configs: Vec<WeChatConfig>,
    /// Email integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_configs: Vec<EmailConfig>,
    /// VictorOps integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub victorops_configs: Vec<VictorOpsConfig>,
    /// Pushover integrations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pushover_configs: Vec<PushoverConfig>,
}

impl Receiver {
    /// Creates a receiver without integrations.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// PagerDuty integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagerDutyConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the Events API v2 integration key.
    pub routing_key: Option<SecretKeySelector>,
    /// Secret key holding the Events API v1 integration key.
    pub service_key: Option<SecretKeySelector>,
    /// API endpoint.
    pub url: Option<String>,
    /// Client identification.
    pub client: Option<String>,
    /// Backlink to the sender.
    #[serde(rename = "clientURL")]
    pub client_url: Option<String>,
    /// Description of the incident.
    pub description: Option<String>,
    /// Severity of the incident.
    pub severity: Option<String>,
    /// Class of the event.
    pub class: Option<String>,
    /// Group of the event.
    pub group: Option<String>,
    /// Component of the event.
    pub component: Option<String>,
    /// Arbitrary key/value details.
    pub details: Vec<KeyValue>,
    /// Images attached to the incident, in order.
    pub pager_duty_image_configs: Vec<PagerDutyImageConfig>,
    /// Links attached to the incident, in order.
    pub pager_duty_link_configs: Vec<PagerDutyLinkConfig>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

/// Image attached to a PagerDuty incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerDutyImageConfig {
    /// Image source.
    pub src: Option<String>,
    /// Link target.
    pub href: Option<String>,
    /// Alternative text.
    pub alt: Option<String>,
}

/// Link attached to a PagerDuty incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerDutyLinkConfig {
    /// Link target.
    pub href: Option<String>,
    /// Link text.
    #[serde(rename = "alt")]
    pub text: Option<String>,
}

/// Webhook integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Target URL. `urlSecret` takes precedence.
    pub url: Option<String>,
    /// Secret key holding the target URL.
    pub url_secret: Option<SecretKeySelector>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
    /// Maximum number of alerts per message; 0 means all.
    pub max_alerts: Option<i32>,
}

/// OpsGenie integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpsGenieConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the API key.
    pub api_key: Option<SecretKeySelector>,
    /// API endpoint.
    #[serde(rename = "apiURL")]
    pub api_url: Option<String>,
    /// Alert text.
    pub message: Option<String>,
    /// Alert description.
    pub description: Option<String>,
    /// Backlink to the sender.
    pub source: Option<String>,
    /// Comma separated tags.
    pub tags: Option<String>,
    /// Additional alert note.
    pub note: Option<String>,
    /// Priority level.
    pub priority: Option<String>,
    /// Arbitrary key/value details.
    pub details: Vec<KeyValue>,
    /// Responders, in order.
    pub responders: Vec<OpsGenieConfigResponder>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

/// Responder of an OpsGenie incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsGenieConfigResponder {
    /// ID of the responder.
    pub id: String,
    /// Name of the responder.
    pub name: String,
    /// Username of the responder.
    pub username: String,
    /// One of `team`, `user`, `escalation`, `schedule`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Slack integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlackConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the webhook URL.
    #[serde(rename = "apiURL")]
    pub api_url: Option<SecretKeySelector>,
    /// Channel or user to send to.
    pub channel: Option<String>,
    /// Sender name.
    pub username: Option<String>,
    /// Attachment color.
    pub color: Option<String>,
    /// Attachment title.
    pub title: Option<String>,
    /// Attachment title link.
    pub title_link: Option<String>,
    /// Attachment pretext.
    pub pretext: Option<String>,
    /// Attachment text.
    pub text: Option<String>,
    /// Attachment fields, in order.
    pub fields: Vec<SlackField>,
    /// Whether fields are short by default.
    pub short_fields: Option<bool>,
    /// Attachment footer.
    pub footer: Option<String>,
    /// Fallback text.
    pub fallback: Option<String>,
    /// Callback identifier.
    pub callback_id: Option<String>,
    /// Icon emoji.
    pub icon_emoji: Option<String>,
    /// Icon URL.
    #[serde(rename = "iconURL")]
    pub icon_url: Option<String>,
    /// Image URL.
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    /// Thumbnail URL.
    #[serde(rename = "thumbURL")]
    pub thumb_url: Option<String>,
    /// Whether to link channel and user names.
    pub link_names: Option<bool>,
    /// Fields rendered as markdown.
    pub mrkdwn_in: Vec<String>,
    /// Message actions, in order.
    pub actions: Vec<SlackAction>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

/// A Slack message button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackAction {
    /// Action type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Button text.
    pub text: String,
    /// Target URL.
    pub url: String,
    /// Button style.
    pub style: String,
    /// Action name.
    pub name: String,
    /// Action value.
    pub value: String,
    /// Confirmation dialog.
    #[serde(rename = "confirm", skip_serializing_if = "Option::is_none")]
    pub confirm_field: Option<SlackConfirmationField>,
}

/// Confirmation dialog of a Slack action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlackConfirmationField {
    /// Dialog text.
    pub text: String,
    /// Dialog title.
    pub title: Option<String>,
    /// Confirm button label.
    pub ok_text: Option<String>,
    /// Dismiss button label.
    pub dismiss_text: Option<String>,
}

/// A Slack attachment field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackField {
    /// Field title.
    pub title: String,
    /// Field value.
    pub value: String,
    /// Whether the field is short.
    pub short: Option<bool>,
}

/// WeChat integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeChatConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the API secret.
    pub api_secret: Option<SecretKeySelector>,
    /// API endpoint.
    #[serde(rename = "apiURL")]
    pub api_url: Option<String>,
    /// Corporate identifier.
    #[serde(rename = "corpID")]
    pub corp_id: Option<String>,
    /// Agent identifier.
    #[serde(rename = "agentID")]
    pub agent_id: Option<String>,
    /// Target users.
    pub to_user: Option<String>,
    /// Target parties.
    pub to_party: Option<String>,
    /// Target tags.
    pub to_tag: Option<String>,
    /// Message text.
    pub message: Option<String>,
    /// Message type.
    pub message_type: Option<String>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

/// Email integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Recipient address.
    pub to: Option<String>,
    /// Sender address.
    pub from: Option<String>,
    /// Hostname announced to the SMTP server.
    pub hello: Option<String>,
    /// SMTP server as `host:port`.
    pub smarthost: Option<String>,
    /// Username for authentication.
    pub auth_username: Option<String>,
    /// Secret key holding the password for authentication.
    pub auth_password: Option<SecretKeySelector>,
    /// Secret key holding the CRAM-MD5 secret.
    pub auth_secret: Option<SecretKeySelector>,
    /// Identity for authentication.
    pub auth_identity: Option<String>,
    /// Additional headers; names are case-insensitive.
    pub headers: Vec<KeyValue>,
    /// HTML body.
    pub html: Option<String>,
    /// Text body.
    pub text: Option<String>,
    /// Whether STARTTLS is required.
    #[serde(rename = "requireTLS")]
    pub require_tls: Option<bool>,
    /// TLS settings.
    pub tls_config: Option<SafeTlsConfig>,
}

/// VictorOps integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VictorOpsConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the API key.
    pub api_key: Option<SecretKeySelector>,
    /// API endpoint.
    pub api_url: Option<String>,
    /// Routing key for the alert.
    pub routing_key: Option<String>,
    /// Behavior of the alert.
    pub message_type: Option<String>,
    /// Summary of the alerted problem.
    pub entity_display_name: Option<String>,
    /// Long explanation of the alerted problem.
    pub state_message: Option<String>,
    /// Monitoring tool the state message is from.
    pub monitoring_tool: Option<String>,
    /// Additional custom fields.
    pub custom_fields: Vec<KeyValue>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

/// Pushover integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushoverConfig {
    /// Whether to notify about resolved alerts.
    pub send_resolved: Option<bool>,
    /// Secret key holding the recipient user key.
    pub user_key: Option<SecretKeySelector>,
    /// Secret key holding the application token.
    pub token: Option<SecretKeySelector>,
    /// Notification title.
    pub title: Option<String>,
    /// Notification message.
    pub message: Option<String>,
    /// Supplementary URL.
    pub url: Option<String>,
    /// Title of the supplementary URL.
    pub url_title: Option<String>,
    /// Notification sound.
    pub sound: Option<String>,
    /// Priority.
    pub priority: Option<String>,
    /// Retry interval for emergency priority, as a duration.
    pub retry: Option<String>,
    /// Expiry of emergency retries, as a duration.
    pub expire: Option<String>,
    /// Whether the message is HTML.
    pub html: Option<bool>,
    /// HTTP client settings.
    pub http_config: Option<HttpConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_key_display() {
        assert_eq!(TenantKey::new("monitoring", "team-a").to_string(), "monitoring/team-a");
    }

    #[test]
    fn tenant_keys_order_by_namespace_then_name() {
        let mut keys = vec![
            TenantKey::new("b", "a"),
            TenantKey::new("a", "z"),
            TenantKey::new("a", "b"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                TenantKey::new("a", "b"),
                TenantKey::new("a", "z"),
                TenantKey::new("b", "a"),
            ]
        );
    }

    #[test]
    fn decode_resource_from_json() {
        let json = r#"{
            "apiVersion": "monitoring.coreos.com/v1alpha1",
            "kind": "AlertmanagerConfig",
            "metadata": {"namespace": "mynamespace", "name": "myamc"},
            "spec": {
                "route": {
                    "receiver": "test",
                    "groupBy": ["job"],
                    "continue": false,
                    "matchers": [{"name": "severity", "value": "critical"}],
                    "routes": [{"receiver": "child", "matchers": [{"name": "team", "value": "a|b", "regex": true}]}]
                },
                "receivers": [{
                    "name": "test",
                    "webhookConfigs": [{"urlSecret": {"name": "hook", "key": "url"}, "maxAlerts": 5}],
                    "slackConfigs": [{"apiURL": {"name": "slack", "key": "url"}, "iconURL": "http://x/icon.png"}]
                }],
                "inhibitRules": [{"sourceMatch": [{"name": "severity", "value": "critical"}], "equal": ["job"]}]
            }
        }"#;

        let tenant: TenantConfig = serde_json::from_str(json).unwrap();
        assert_eq!(tenant.key(), &TenantKey::new("mynamespace", "myamc"));

        let route = tenant.spec.route.as_ref().unwrap();
        assert_eq!(route.receiver, "test");
        assert_eq!(route.group_by, vec!["job".to_string()]);
        assert_eq!(route.matchers, vec![Matcher::equal("severity", "critical")]);
        assert_eq!(route.routes.len(), 1);
        assert_eq!(route.routes[0].matchers, vec![Matcher::regex("team", "a|b")]);

        let receiver = &tenant.spec.receivers[0];
        assert_eq!(
            receiver.webhook_configs[0].url_secret,
            Some(SecretKeySelector::new("hook", "url"))
        );
        assert_eq!(receiver.webhook_configs[0].max_alerts, Some(5));
        assert_eq!(
            receiver.slack_configs[0].icon_url.as_deref(),
            Some("http://x/icon.png")
        );

        assert_eq!(tenant.spec.inhibit_rules[0].equal, vec!["job".to_string()]);
    }

    #[test]
    fn decode_resource_from_yaml() {
        let yaml = "
metadata:
  namespace: ns
  name: cr
spec:
  receivers:
  - name: mail
    emailConfigs:
    - to: ops@example.com
      smarthost: smtp.example.com:587
      requireTLS: true
      headers:
      - key: Subject
        value: hi
";
        let tenant: TenantConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(tenant.spec.route.is_none());
        let email = &tenant.spec.receivers[0].email_configs[0];
        assert_eq!(email.to.as_deref(), Some("ops@example.com"));
        assert_eq!(email.require_tls, Some(true));
        assert_eq!(email.headers, vec![KeyValue::new("Subject", "hi")]);
    }

    #[test]
    fn decode_time_intervals() {
        let yaml = "
metadata:
  namespace: ns
  name: cr
spec:
  route:
    receiver: r
    muteTimeIntervals: [weekends]
    activeTimeIntervals: [office]
  muteTimeIntervals:
  - name: office
    timeIntervals:
    - times:
      - startTime: '09:00'
        endTime: '17:00'
      weekdays: ['monday:friday']
      daysOfMonth:
      - start: 1
        end: 15
      months: ['january:march']
      years: ['2030']
";
        let tenant: TenantConfig = serde_yaml::from_str(yaml).unwrap();
        let route = tenant.spec.route.as_ref().unwrap();
        assert_eq!(route.mute_time_intervals, vec!["weekends".to_string()]);
        assert_eq!(route.active_time_intervals, vec!["office".to_string()]);

        let interval = &tenant.spec.mute_time_intervals[0];
        assert_eq!(interval.name, "office");
        let period = &interval.time_intervals[0];
        assert_eq!(period.times, vec![TimeRange::new("09:00", "17:00")]);
        assert_eq!(period.weekdays, vec!["monday:friday".to_string()]);
        assert_eq!(period.days_of_month, vec![DayOfMonthRange { start: 1, end: 15 }]);
        assert_eq!(period.years, vec!["2030".to_string()]);
    }

    #[test]
    fn secret_or_config_map_display() {
        assert_eq!(
            SecretOrConfigMap::secret("tls", "ca.crt").to_string(),
            "<secret=tls,key=ca.crt>"
        );
        assert_eq!(
            SecretOrConfigMap::config_map("bundle", "ca").to_string(),
            "<configmap=bundle,key=ca>"
        );
        assert_eq!(SecretOrConfigMap::default().to_string(), "<empty>");
        assert!(SecretOrConfigMap::default().is_empty());
    }
}
