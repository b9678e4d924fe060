//! Semantic validation of tenant configurations.
//!
//! Every leaf of the tenant model implements [`Validate`]; [`validate_tenant`]
//! walks the whole spec once and stops at the first problem. Errors carry the
//! path of the offending value, e.g. `route.routes[1].routes[0]`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::duration::parse_duration;
use crate::error::{FieldPath, ValidationError};
use crate::intervals::check_time_interval;
use crate::tenant::{
    EmailConfig, HttpConfig, InhibitRule, Matcher, OpsGenieConfig, OpsGenieConfigResponder,
    PagerDutyConfig, PushoverConfig, Receiver, Route, SafeTlsConfig, SlackAction,
    SlackConfig, SlackConfirmationField, SlackField, TenantConfig, TenantSpec, TimeInterval,
    VictorOpsConfig, WeChatConfig, WebhookConfig,
};

/// Custom field keys VictorOps reserves for itself.
pub const VICTOROPS_RESERVED_FIELDS: &[&str] = &[
    "routing_key",
    "message_type",
    "state_message",
    "entity_display_name",
    "monitoring_tool",
    "entity_id",
    "entity_state",
];

static OPSGENIE_RESPONDER_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(team|user|escalation|schedule)$").unwrap_or_else(|_| unreachable!())
});

/// A value that can check its own consistency.
pub trait Validate {
    /// Validates the value found at `path`.
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.as_ref().map_or(Ok(()), |v| v.validate(path))
    }
}

impl<T: Validate> Validate for [T] {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate(&path.index(i)))
    }
}

/// Validates a tenant configuration.
pub fn validate_tenant(tenant: &TenantConfig) -> Result<(), ValidationError> {
    debug!(tenant = %tenant.key(), "validating tenant");
    tenant.spec.validate(&FieldPath::root())
}

impl Validate for TenantSpec {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        let receivers_path = path.field("receivers");
        let mut names = HashSet::with_capacity(self.receivers.len());
        for (i, receiver) in self.receivers.iter().enumerate() {
            let receiver_path = receivers_path.index(i);
            if !names.insert(receiver.name.as_str()) {
                return Err(ValidationError::new(
                    &receiver_path.field("name"),
                    format!("receiver {:?} is not unique", receiver.name),
                ));
            }
            receiver.validate(&receiver_path)?;
        }

        let intervals_path = path.field("muteTimeIntervals");
        let mut intervals = HashSet::with_capacity(self.mute_time_intervals.len());
        for (i, interval) in self.mute_time_intervals.iter().enumerate() {
            let interval_path = intervals_path.index(i);
            interval.validate(&interval_path)?;
            if !intervals.insert(interval.name.as_str()) {
                return Err(ValidationError::new(
                    &interval_path.field("name"),
                    format!("time interval {:?} is not unique", interval.name),
                ));
            }
        }

        if let Some(route) = &self.route {
            let known = KnownNames {
                receivers: &names,
                intervals: &intervals,
            };
            validate_route(route, &path.field("route"), &known, true)?;
        }

        self.inhibit_rules.validate(&path.field("inhibitRules"))
    }
}

impl Validate for TimeInterval {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        check_time_interval(self, path).map(|_| ())
    }
}

/// Names a route may refer to.
struct KnownNames<'a> {
    receivers: &'a HashSet<&'a str>,
    intervals: &'a HashSet<&'a str>,
}

fn validate_route(
    route: &Route,
    path: &FieldPath,
    known: &KnownNames<'_>,
    is_root: bool,
) -> Result<(), ValidationError> {
    if route.receiver.is_empty() {
        if is_root {
            return Err(ValidationError::new(path, "root route must define a receiver"));
        }
    } else if !known.receivers.contains(route.receiver.as_str()) {
        return Err(ValidationError::new(
            path,
            format!("receiver {:?} not found", route.receiver),
        ));
    }

    validate_group_by(&route.group_by, &path.field("groupBy"))?;

    for (field, kind, names) in [
        ("muteTimeIntervals", "mute time interval", &route.mute_time_intervals),
        ("activeTimeIntervals", "time interval", &route.active_time_intervals),
    ] {
        for (i, name) in names.iter().enumerate() {
            if !known.intervals.contains(name.as_str()) {
                return Err(ValidationError::new(
                    &path.field(field).index(i),
                    format!("{kind} {name:?} not found"),
                ));
            }
        }
    }

    for (field, value) in [
        ("groupWait", &route.group_wait),
        ("groupInterval", &route.group_interval),
        ("repeatInterval", &route.repeat_interval),
    ] {
        validate_duration(Some(value), &path.field(field))?;
    }

    route.matchers.validate(&path.field("matchers"))?;

    let children = path.field("routes");
    for (i, child) in route.routes.iter().enumerate() {
        validate_route(child, &children.index(i), known, false)?;
    }
    Ok(())
}

fn validate_group_by(labels: &[String], path: &FieldPath) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(ValidationError::new(
                path,
                format!("duplicated label {label:?} in groupBy"),
            ));
        }
    }
    if seen.contains("...") && labels.len() > 1 {
        return Err(ValidationError::new(path, "'...' must be a sole value in groupBy"));
    }
    Ok(())
}

fn validate_duration(value: Option<&String>, path: &FieldPath) -> Result<(), ValidationError> {
    match value {
        Some(raw) if !raw.is_empty() => parse_duration(raw)
            .map(|_| ())
            .map_err(|e| ValidationError::new(path, e.to_string())),
        _ => Ok(()),
    }
}

fn validate_url(value: Option<&String>, path: &FieldPath) -> Result<(), ValidationError> {
    match value {
        Some(raw) => Url::parse(raw)
            .map(|_| ())
            .map_err(|e| ValidationError::new(path, format!("invalid URL {raw:?}: {e}"))),
        None => Ok(()),
    }
}

/// Splits `host:port` the way Go's `net.SplitHostPort` does.
///
/// Bracketed IPv6 hosts are accepted and the port may be empty.
pub fn split_host_port(address: &str) -> Result<(&str, &str), String> {
    let missing_port = || format!("address {address}: missing port in address");
    let too_many_colons = || format!("address {address}: too many colons in address");
    let unexpected = |c: char| format!("address {address}: unexpected '{c}' in address");

    let colon = address.rfind(':').ok_or_else(missing_port)?;

    let (host, j, k) = if let Some(stripped) = address.strip_prefix('[') {
        let end = stripped
            .find(']')
            .ok_or_else(|| format!("address {address}: missing ']' in address"))?;
        // `end + 1` is the position of ']' in `address`; the last colon must follow it.
        match end + 2 {
            n if n == address.len() => return Err(missing_port()),
            n if n == colon => {}
            n => {
                return Err(if address.as_bytes().get(n) == Some(&b':') {
                    too_many_colons()
                } else {
                    missing_port()
                });
            }
        }
        (&stripped[..end], 1, end + 2)
    } else {
        let host = &address[..colon];
        if host.contains(':') {
            return Err(too_many_colons());
        }
        (host, 0, 0)
    };

    if address[j..].contains('[') {
        return Err(unexpected('['));
    }
    if address[k..].contains(']') {
        return Err(unexpected(']'));
    }

    Ok((host, &address[colon + 1..]))
}

impl Validate for Matcher {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::new(path, "matcher name must not be empty"));
        }
        if self.regex {
            Regex::new(&format!("^(?:{})$", self.value)).map_err(|e| {
                ValidationError::new(
                    path,
                    format!("invalid regex {:?} for label {:?}: {e}", self.value, self.name),
                )
            })?;
        }
        Ok(())
    }
}

impl Validate for InhibitRule {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.source_match.validate(&path.field("sourceMatch"))?;
        self.target_match.validate(&path.field("targetMatch"))
    }
}

impl Validate for Receiver {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.opsgenie_configs.validate(&path.field("opsgenieConfigs"))?;
        self.pagerduty_configs.validate(&path.field("pagerdutyConfigs"))?;
        self.slack_configs.validate(&path.field("slackConfigs"))?;
        self.webhook_configs.validate(&path.field("webhookConfigs"))?;
        self.wechat_configs.validate(&path.field("wechatConfigs"))?;
        self.email_configs.validate(&path.field("emailConfigs"))?;
        self.victorops_configs.validate(&path.field("victoropsConfigs"))?;
        self.pushover_configs.validate(&path.field("pushoverConfigs"))
    }
}

impl Validate for HttpConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.basic_auth.is_some() && self.bearer_token_secret.is_some() {
            return Err(ValidationError::new(
                path,
                "at most one of basicAuth and bearerTokenSecret must be configured",
            ));
        }
        validate_url(self.proxy_url.as_ref(), &path.field("proxyURL"))?;
        self.tls_config.validate(&path.field("tlsConfig"))
    }
}

impl Validate for SafeTlsConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        for (field, source) in [("ca", &self.ca), ("cert", &self.cert)] {
            if source.secret.is_some() && source.config_map.is_some() {
                return Err(ValidationError::new(
                    &path.field(field),
                    "cannot specify both Secret and ConfigMap",
                ));
            }
        }
        match (self.cert.is_empty(), self.key_secret.is_some()) {
            (false, false) => Err(ValidationError::new(path, "client cert specified without client key")),
            (true, true) => Err(ValidationError::new(path, "client key specified without client cert")),
            _ => Ok(()),
        }
    }
}

impl Validate for PagerDutyConfig {
    fn validate(&self, _path: &FieldPath) -> Result<(), ValidationError> {
        // Any combination of fields is accepted.
        Ok(())
    }
}

impl Validate for WebhookConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.url.is_none() && self.url_secret.is_none() {
            return Err(ValidationError::new(path, "one of url or urlSecret should be specified"));
        }
        validate_url(self.url.as_ref(), &path.field("url"))?;
        if self.max_alerts.is_some_and(|n| n < 0) {
            return Err(ValidationError::new(&path.field("maxAlerts"), "must not be negative"));
        }
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for WeChatConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        validate_url(self.api_url.as_ref(), &path.field("apiURL"))?;
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for EmailConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.to.as_deref().unwrap_or_default().is_empty() {
            return Err(ValidationError::new(&path.field("to"), "missing 'to' address"));
        }

        if let Some(smarthost) = &self.smarthost {
            split_host_port(smarthost)
                .map_err(|e| ValidationError::new(&path.field("smarthost"), format!("invalid 'smarthost': {e}")))?;
        }

        let mut seen = HashSet::with_capacity(self.headers.len());
        for (i, header) in self.headers.iter().enumerate() {
            if !seen.insert(header.key.to_lowercase()) {
                return Err(ValidationError::new(
                    &path.field("headers").index(i),
                    format!("duplicate header {:?}", header.key),
                ));
            }
        }

        self.tls_config.validate(&path.field("tlsConfig"))
    }
}

impl Validate for VictorOpsConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.routing_key.as_deref().unwrap_or_default().is_empty() {
            return Err(ValidationError::new(&path.field("routingKey"), "missing 'routingKey' key"));
        }

        for (i, field) in self.custom_fields.iter().enumerate() {
            if VICTOROPS_RESERVED_FIELDS.contains(&field.key.as_str()) {
                return Err(ValidationError::new(
                    &path.field("customFields").index(i),
                    format!("usage of reserved word {:?} is not allowed in custom fields", field.key),
                ));
            }
        }

        validate_url(self.api_url.as_ref(), &path.field("apiUrl"))?;
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for PushoverConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.user_key.is_none() {
            return Err(ValidationError::new(&path.field("userKey"), "mandatory field 'userKey' is missing"));
        }
        if self.token.is_none() {
            return Err(ValidationError::new(&path.field("token"), "mandatory field 'token' is missing"));
        }
        validate_duration(self.retry.as_ref(), &path.field("retry"))?;
        validate_duration(self.expire.as_ref(), &path.field("expire"))?;
        validate_url(self.url.as_ref(), &path.field("url"))?;
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for OpsGenieConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.responders.validate(&path.field("responders"))?;
        validate_url(self.api_url.as_ref(), &path.field("apiURL"))?;
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for OpsGenieConfigResponder {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.id.is_empty() && self.name.is_empty() && self.username.is_empty() {
            return Err(ValidationError::new(
                path,
                "responder must have at least an ID, a Name or an Username defined",
            ));
        }
        if !OPSGENIE_RESPONDER_TYPE.is_match(&self.kind) {
            return Err(ValidationError::new(
                &path.field("type"),
                format!("responder type {:?} should match team|user|escalation|schedule", self.kind),
            ));
        }
        Ok(())
    }
}

impl Validate for SlackConfig {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        self.actions.validate(&path.field("actions"))?;
        self.fields.validate(&path.field("fields"))?;
        self.http_config.validate(&path.field("httpConfig"))
    }
}

impl Validate for SlackAction {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.kind.is_empty() {
            return Err(ValidationError::new(path, "missing type in Slack action configuration"));
        }
        if self.text.is_empty() {
            return Err(ValidationError::new(path, "missing text in Slack action configuration"));
        }
        if self.url.is_empty() && self.name.is_empty() {
            return Err(ValidationError::new(path, "missing name or url in Slack action configuration"));
        }
        self.confirm_field.validate(&path.field("confirm"))
    }
}

impl Validate for SlackConfirmationField {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::new(path, "missing text in Slack confirmation configuration"));
        }
        Ok(())
    }
}

impl Validate for SlackField {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::new(path, "missing title in Slack field configuration"));
        }
        if self.value.is_empty() {
            return Err(ValidationError::new(path, "missing value in Slack field configuration"));
        }
        Ok(())
    }
}
