//! Receiver compilation: tenant receivers to upstream receivers.
//!
//! A tenant receiver holds up to eight lists of integrations. Each entry is
//! visited as an [`Integration`], compiled into a [`CompiledIntegration`] with
//! every secret selector replaced by its value, and appended to the upstream
//! receiver under the matching key.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::alertmanager::{self as am, GlobalConfig};
use crate::error::{ComposeError, FieldPath, Result, SecretError};
use crate::routes::namespaced_name;
use crate::secrets::{SecretResolver, TlsAssetKey};
use crate::tenant::{
    self, HttpConfig, KeyValue, SafeTlsConfig, SecretKeySelector, SecretOrConfigMap, TenantKey,
};
use crate::validation::VICTOROPS_RESERVED_FIELDS;

/// The integration kinds a receiver can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntegrationKind {
    /// PagerDuty.
    PagerDuty,
    /// OpsGenie.
    OpsGenie,
    /// Slack.
    Slack,
    /// Generic webhook.
    Webhook,
    /// WeChat.
    WeChat,
    /// Email.
    Email,
    /// VictorOps.
    VictorOps,
    /// Pushover.
    Pushover,
}

impl IntegrationKind {
    /// All kinds, in the order they are compiled.
    pub const ALL: [Self; 8] = [
        Self::PagerDuty,
        Self::OpsGenie,
        Self::Slack,
        Self::Webhook,
        Self::WeChat,
        Self::Email,
        Self::VictorOps,
        Self::Pushover,
    ];

    /// Name of the list in the tenant receiver.
    #[must_use]
    pub const fn crd_field(&self) -> &'static str {
        match self {
            Self::PagerDuty => "pagerdutyConfigs",
            Self::OpsGenie => "opsgenieConfigs",
            Self::Slack => "slackConfigs",
            Self::Webhook => "webhookConfigs",
            Self::WeChat => "wechatConfigs",
            Self::Email => "emailConfigs",
            Self::VictorOps => "victoropsConfigs",
            Self::Pushover => "pushoverConfigs",
        }
    }

    /// Name of the list in the upstream receiver.
    #[must_use]
    pub const fn wire_key(&self) -> &'static str {
        match self {
            Self::PagerDuty => "pagerduty_configs",
            Self::OpsGenie => "opsgenie_configs",
            Self::Slack => "slack_configs",
            Self::Webhook => "webhook_configs",
            Self::WeChat => "wechat_configs",
            Self::Email => "email_configs",
            Self::VictorOps => "victorops_configs",
            Self::Pushover => "pushover_configs",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_key())
    }
}

/// One integration of a tenant receiver.
#[derive(Debug, Clone, Copy)]
pub enum Integration<'a> {
    /// PagerDuty.
    PagerDuty(&'a tenant::PagerDutyConfig),
    /// OpsGenie.
    OpsGenie(&'a tenant::OpsGenieConfig),
    /// Slack.
    Slack(&'a tenant::SlackConfig),
    /// Generic webhook.
    Webhook(&'a tenant::WebhookConfig),
    /// WeChat.
    WeChat(&'a tenant::WeChatConfig),
    /// Email.
    Email(&'a tenant::EmailConfig),
    /// VictorOps.
    VictorOps(&'a tenant::VictorOpsConfig),
    /// Pushover.
    Pushover(&'a tenant::PushoverConfig),
}

impl<'a> Integration<'a> {
    /// Returns the kind of the integration.
    #[must_use]
    pub const fn kind(&self) -> IntegrationKind {
        match self {
            Self::PagerDuty(_) => IntegrationKind::PagerDuty,
            Self::OpsGenie(_) => IntegrationKind::OpsGenie,
            Self::Slack(_) => IntegrationKind::Slack,
            Self::Webhook(_) => IntegrationKind::Webhook,
            Self::WeChat(_) => IntegrationKind::WeChat,
            Self::Email(_) => IntegrationKind::Email,
            Self::VictorOps(_) => IntegrationKind::VictorOps,
            Self::Pushover(_) => IntegrationKind::Pushover,
        }
    }

    /// Lists the integrations of a receiver with their paths below `path`.
    ///
    /// Kinds follow [`IntegrationKind::ALL`]; entries of one kind keep their order.
    #[must_use]
    pub fn collect(receiver: &'a tenant::Receiver, path: &FieldPath) -> Vec<(FieldPath, Self)> {
        fn push<'a, T>(
            out: &mut Vec<(FieldPath, Integration<'a>)>,
            path: &FieldPath,
            kind: IntegrationKind,
            items: &'a [T],
            wrap: fn(&'a T) -> Integration<'a>,
        ) {
            let list = path.field(kind.crd_field());
            out.extend(items.iter().enumerate().map(|(i, item)| (list.index(i), wrap(item))));
        }

        let mut out = Vec::new();
        push(&mut out, path, IntegrationKind::PagerDuty, &receiver.pagerduty_configs, Self::PagerDuty);
        push(&mut out, path, IntegrationKind::OpsGenie, &receiver.opsgenie_configs, Self::OpsGenie);
        push(&mut out, path, IntegrationKind::Slack, &receiver.slack_configs, Self::Slack);
        push(&mut out, path, IntegrationKind::Webhook, &receiver.webhook_configs, Self::Webhook);
        push(&mut out, path, IntegrationKind::WeChat, &receiver.wechat_configs, Self::WeChat);
        push(&mut out, path, IntegrationKind::Email, &receiver.email_configs, Self::Email);
        push(&mut out, path, IntegrationKind::VictorOps, &receiver.victorops_configs, Self::VictorOps);
        push(&mut out, path, IntegrationKind::Pushover, &receiver.pushover_configs, Self::Pushover);
        out
    }

    /// Compiles the integration.
    pub fn compile(&self, compiler: &mut ReceiverCompiler<'_>, path: &FieldPath) -> Result<CompiledIntegration> {
        Ok(match *self {
            Self::PagerDuty(c) => CompiledIntegration::PagerDuty(compiler.pagerduty(c, path)?),
            Self::OpsGenie(c) => CompiledIntegration::OpsGenie(compiler.opsgenie(c, path)?),
            Self::Slack(c) => CompiledIntegration::Slack(compiler.slack(c, path)?),
            Self::Webhook(c) => CompiledIntegration::Webhook(compiler.webhook(c, path)?),
            Self::WeChat(c) => CompiledIntegration::WeChat(compiler.wechat(c, path)?),
            Self::Email(c) => CompiledIntegration::Email(compiler.email(c, path)?),
            Self::VictorOps(c) => CompiledIntegration::VictorOps(compiler.victorops(c, path)?),
            Self::Pushover(c) => CompiledIntegration::Pushover(compiler.pushover(c, path)?),
        })
    }
}

/// One compiled integration, ready to be attached to a receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledIntegration {
    /// PagerDuty.
    PagerDuty(am::PagerDutyConfig),
    /// OpsGenie.
    OpsGenie(am::OpsGenieConfig),
    /// Slack.
    Slack(am::SlackConfig),
    /// Generic webhook.
    Webhook(am::WebhookConfig),
    /// WeChat.
    WeChat(am::WeChatConfig),
    /// Email.
    Email(am::EmailConfig),
    /// VictorOps.
    VictorOps(am::VictorOpsConfig),
    /// Pushover.
    Pushover(am::PushoverConfig),
}

impl CompiledIntegration {
    /// Appends the integration to the matching list of `receiver`.
    pub fn attach(self, receiver: &mut am::Receiver) {
        match self {
            Self::PagerDuty(c) => receiver.pagerduty_configs.push(c),
            Self::OpsGenie(c) => receiver.opsgenie_configs.push(c),
            Self::Slack(c) => receiver.slack_configs.push(c),
            Self::Webhook(c) => receiver.webhook_configs.push(c),
            Self::WeChat(c) => receiver.wechat_configs.push(c),
            Self::Email(c) => receiver.email_configs.push(c),
            Self::VictorOps(c) => receiver.victorops_configs.push(c),
            Self::Pushover(c) => receiver.pushover_configs.push(c),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn key_values(pairs: &[KeyValue]) -> BTreeMap<String, String> {
    pairs.iter().map(|kv| (kv.key.clone(), kv.value.clone())).collect()
}

/// Compiles the receivers of one tenant.
pub struct ReceiverCompiler<'a> {
    resolver: &'a dyn SecretResolver,
    tenant: &'a TenantKey,
    tls_assets_dir: &'a Path,
    global: Option<&'a GlobalConfig>,
    tls_assets: BTreeSet<TlsAssetKey>,
}

impl<'a> ReceiverCompiler<'a> {
    /// Creates a compiler for `tenant`.
    #[must_use]
    pub fn new(resolver: &'a dyn SecretResolver, tenant: &'a TenantKey, tls_assets_dir: &'a Path) -> Self {
        Self {
            resolver,
            tenant,
            tls_assets_dir,
            global: None,
            tls_assets: BTreeSet::new(),
        }
    }

    /// Sets the global section used for email defaults.
    #[must_use]
    pub fn with_global(mut self, global: Option<&'a GlobalConfig>) -> Self {
        self.global = global;
        self
    }

    /// TLS assets referenced by the receivers compiled so far.
    #[must_use]
    pub const fn tls_assets(&self) -> &BTreeSet<TlsAssetKey> {
        &self.tls_assets
    }

    /// Consumes the compiler, returning the referenced TLS assets.
    #[must_use]
    pub fn into_tls_assets(self) -> BTreeSet<TlsAssetKey> {
        self.tls_assets
    }

    /// Compiles one receiver found at `path`.
    pub fn compile(&mut self, receiver: &tenant::Receiver, path: &FieldPath) -> Result<am::Receiver> {
        let mut out = am::Receiver::named(namespaced_name(self.tenant, &receiver.name));

        let integrations = Integration::collect(receiver, path);
        let count = integrations.len();
        for (integration_path, integration) in integrations {
            integration.compile(self, &integration_path)?.attach(&mut out);
        }

        debug!(
            tenant = %self.tenant,
            receiver = %out.name,
            integrations = count,
            "compiled receiver"
        );
        Ok(out)
    }

    fn resolution_error(&self, path: &FieldPath, source: SecretError) -> ComposeError {
        ComposeError::SecretResolution {
            tenant: self.tenant.clone(),
            path: path.clone(),
            source,
        }
    }

    fn invalid(&self, path: &FieldPath, reason: impl Into<String>) -> ComposeError {
        ComposeError::InvalidReceiver {
            tenant: self.tenant.clone(),
            path: path.clone(),
            reason: reason.into(),
        }
    }

    fn secret(&self, selector: &SecretKeySelector, path: &FieldPath) -> Result<String> {
        self.resolver
            .get_secret_key(&self.tenant.namespace, selector)
            .map_err(|e| self.resolution_error(path, e))
    }

    /// Reads a URL from a secret, trimming surrounding whitespace.
    fn url_secret(&self, selector: &SecretKeySelector, path: &FieldPath) -> Result<String> {
        let raw = self.secret(selector, path)?;
        let url = raw.trim();
        Url::parse(url).map_err(|e| {
            self.invalid(
                path,
                format!(
                    "invalid URL {url:?} in key {:?} from secret {:?}: {e}",
                    selector.key, selector.name
                ),
            )
        })?;
        Ok(url.to_string())
    }

    fn opt_secret(&self, selector: Option<&SecretKeySelector>, path: &FieldPath) -> Result<Option<String>> {
        selector.map(|s| self.secret(s, path)).transpose()
    }

    fn required_secret(&self, selector: Option<&SecretKeySelector>, path: &FieldPath, field: &str) -> Result<String> {
        let selector = selector.ok_or_else(|| self.invalid(path, format!("mandatory field {field:?} is missing")))?;
        let value = self.secret(selector, path)?;
        if value.is_empty() {
            return Err(self.invalid(path, format!("mandatory field {field:?} is empty")));
        }
        Ok(value)
    }

    fn tls_file(&mut self, selector: &SecretOrConfigMap, path: &FieldPath) -> Result<Option<String>> {
        if selector.is_empty() {
            return Ok(None);
        }
        let asset = TlsAssetKey::from_selector(&self.tenant.namespace, selector)
            .map_err(|e| self.resolution_error(path, e))?;
        let file = self
            .resolver
            .tls_asset_path(self.tls_assets_dir, &self.tenant.namespace, selector)
            .map_err(|e| self.resolution_error(path, e))?;
        self.tls_assets.insert(asset);
        Ok(Some(file))
    }

    fn tls_config(&mut self, tls: &SafeTlsConfig, path: &FieldPath) -> Result<am::TlsConfig> {
        let key_selector = tls.key_secret.as_ref().map(|s| SecretOrConfigMap {
            secret: Some(s.clone()),
            config_map: None,
        });

        Ok(am::TlsConfig {
            ca_file: self.tls_file(&tls.ca, &path.field("ca"))?,
            cert_file: self.tls_file(&tls.cert, &path.field("cert"))?,
            key_file: match key_selector {
                Some(selector) => self.tls_file(&selector, &path.field("keySecret"))?,
                None => None,
            },
            server_name: tls.server_name.clone(),
            insecure_skip_verify: tls.insecure_skip_verify.unwrap_or(false),
        })
    }

    fn http_config(&mut self, http: Option<&HttpConfig>, path: &FieldPath) -> Result<Option<am::HttpClientConfig>> {
        let Some(http) = http else {
            return Ok(None);
        };
        let path = path.field("httpConfig");

        let basic_auth = match &http.basic_auth {
            Some(auth) => {
                let auth_path = path.field("basicAuth");
                Some(am::BasicAuth {
                    username: self.secret(&auth.username, &auth_path.field("username"))?,
                    password: self.secret(&auth.password, &auth_path.field("password"))?,
                })
            }
            None => None,
        };

        let tls_config = match &http.tls_config {
            Some(tls) => Some(self.tls_config(tls, &path.field("tlsConfig"))?),
            None => None,
        };

        Ok(Some(am::HttpClientConfig {
            basic_auth,
            bearer_token: self.opt_secret(http.bearer_token_secret.as_ref(), &path.field("bearerTokenSecret"))?,
            tls_config,
            proxy_url: http.proxy_url.clone(),
        }))
    }

    fn pagerduty(&mut self, c: &tenant::PagerDutyConfig, path: &FieldPath) -> Result<am::PagerDutyConfig> {
        Ok(am::PagerDutyConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            service_key: self.opt_secret(c.service_key.as_ref(), &path.field("serviceKey"))?,
            routing_key: self.opt_secret(c.routing_key.as_ref(), &path.field("routingKey"))?,
            url: c.url.clone(),
            client: c.client.clone(),
            client_url: c.client_url.clone(),
            description: c.description.clone(),
            details: key_values(&c.details),
            images: c
                .pager_duty_image_configs
                .iter()
                .map(|img| am::PagerDutyImage {
                    src: img.src.clone(),
                    alt: img.alt.clone(),
                    href: img.href.clone(),
                })
                .collect(),
            links: c
                .pager_duty_link_configs
                .iter()
                .map(|link| am::PagerDutyLink {
                    href: link.href.clone(),
                    text: link.text.clone(),
                })
                .collect(),
            severity: c.severity.clone(),
            class: c.class.clone(),
            component: c.component.clone(),
            group: c.group.clone(),
            extra: am::Extra::new(),
        })
    }

    fn opsgenie(&mut self, c: &tenant::OpsGenieConfig, path: &FieldPath) -> Result<am::OpsGenieConfig> {
        Ok(am::OpsGenieConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            api_key: self.opt_secret(c.api_key.as_ref(), &path.field("apiKey"))?,
            api_url: c.api_url.clone(),
            message: c.message.clone(),
            description: c.description.clone(),
            source: c.source.clone(),
            details: key_values(&c.details),
            responders: c
                .responders
                .iter()
                .map(|r| am::OpsGenieResponder {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    username: r.username.clone(),
                    kind: r.kind.clone(),
                })
                .collect(),
            tags: c.tags.clone(),
            note: c.note.clone(),
            priority: c.priority.clone(),
            extra: am::Extra::new(),
        })
    }

    fn slack(&mut self, c: &tenant::SlackConfig, path: &FieldPath) -> Result<am::SlackConfig> {
        Ok(am::SlackConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            api_url: c
                .api_url
                .as_ref()
                .map(|selector| self.url_secret(selector, &path.field("apiURL")))
                .transpose()?,
            channel: c.channel.clone(),
            username: c.username.clone(),
            color: c.color.clone(),
            title: c.title.clone(),
            title_link: c.title_link.clone(),
            pretext: c.pretext.clone(),
            text: c.text.clone(),
            fields: c
                .fields
                .iter()
                .map(|f| am::SlackField {
                    title: f.title.clone(),
                    value: f.value.clone(),
                    short: f.short,
                })
                .collect(),
            short_fields: c.short_fields,
            footer: c.footer.clone(),
            fallback: c.fallback.clone(),
            callback_id: c.callback_id.clone(),
            icon_emoji: c.icon_emoji.clone(),
            icon_url: c.icon_url.clone(),
            image_url: c.image_url.clone(),
            thumb_url: c.thumb_url.clone(),
            link_names: c.link_names,
            mrkdwn_in: c.mrkdwn_in.clone(),
            actions: c
                .actions
                .iter()
                .map(|a| am::SlackAction {
                    kind: a.kind.clone(),
                    text: a.text.clone(),
                    url: a.url.clone(),
                    style: a.style.clone(),
                    name: a.name.clone(),
                    value: a.value.clone(),
                    confirm: a.confirm_field.as_ref().map(|cf| am::SlackConfirmationField {
                        text: cf.text.clone(),
                        title: cf.title.clone(),
                        ok_text: cf.ok_text.clone(),
                        dismiss_text: cf.dismiss_text.clone(),
                    }),
                })
                .collect(),
            extra: am::Extra::new(),
        })
    }

    fn webhook(&mut self, c: &tenant::WebhookConfig, path: &FieldPath) -> Result<am::WebhookConfig> {
        let url = match &c.url_secret {
            Some(selector) => Some(self.url_secret(selector, &path.field("urlSecret"))?),
            None => c.url.clone(),
        };
        if url.is_none() {
            return Err(self.invalid(path, "one of url or urlSecret should be specified"));
        }

        Ok(am::WebhookConfig {
            send_resolved: c.send_resolved,
            url,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            max_alerts: c.max_alerts.filter(|n| *n > 0),
            extra: am::Extra::new(),
        })
    }

    fn wechat(&mut self, c: &tenant::WeChatConfig, path: &FieldPath) -> Result<am::WeChatConfig> {
        Ok(am::WeChatConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            api_secret: self.opt_secret(c.api_secret.as_ref(), &path.field("apiSecret"))?,
            api_url: c.api_url.clone(),
            corp_id: c.corp_id.clone(),
            agent_id: c.agent_id.clone(),
            to_user: c.to_user.clone(),
            to_party: c.to_party.clone(),
            to_tag: c.to_tag.clone(),
            message: c.message.clone(),
            message_type: c.message_type.clone(),
            extra: am::Extra::new(),
        })
    }

    fn email(&mut self, c: &tenant::EmailConfig, path: &FieldPath) -> Result<am::EmailConfig> {
        let smarthost = non_empty(c.smarthost.as_ref());
        let from = non_empty(c.from.as_ref());

        let global_smarthost = self.global.and_then(|g| non_empty(g.smtp_smarthost.as_ref()));
        if smarthost.or(global_smarthost).is_none() {
            return Err(self.invalid(
                &path.field("smarthost"),
                "SMTP smarthost is not set in the receiver nor in the global configuration",
            ));
        }
        let global_from = self.global.and_then(|g| non_empty(g.smtp_from.as_ref()));
        if from.or(global_from).is_none() {
            return Err(self.invalid(
                &path.field("from"),
                "SMTP from is not set in the receiver nor in the global configuration",
            ));
        }

        let tls_config = match &c.tls_config {
            Some(tls) => Some(self.tls_config(tls, &path.field("tlsConfig"))?),
            None => None,
        };

        Ok(am::EmailConfig {
            send_resolved: c.send_resolved,
            to: c.to.clone(),
            from: from.map(str::to_string),
            hello: c.hello.clone(),
            smarthost: smarthost.map(str::to_string),
            auth_username: c.auth_username.clone(),
            auth_password: self.opt_secret(c.auth_password.as_ref(), &path.field("authPassword"))?,
            auth_secret: self.opt_secret(c.auth_secret.as_ref(), &path.field("authSecret"))?,
            auth_identity: c.auth_identity.clone(),
            headers: key_values(&c.headers),
            html: c.html.clone(),
            text: c.text.clone(),
            require_tls: c.require_tls,
            tls_config,
            extra: am::Extra::new(),
        })
    }

    fn victorops(&mut self, c: &tenant::VictorOpsConfig, path: &FieldPath) -> Result<am::VictorOpsConfig> {
        for (i, field) in c.custom_fields.iter().enumerate() {
            if VICTOROPS_RESERVED_FIELDS.contains(&field.key.as_str()) {
                return Err(self.invalid(
                    &path.field("customFields").index(i),
                    format!("usage of reserved word {:?} is not allowed in custom fields", field.key),
                ));
            }
        }

        Ok(am::VictorOpsConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            api_key: self.opt_secret(c.api_key.as_ref(), &path.field("apiKey"))?,
            api_url: c.api_url.clone(),
            routing_key: c.routing_key.clone(),
            message_type: c.message_type.clone(),
            state_message: c.state_message.clone(),
            entity_display_name: c.entity_display_name.clone(),
            monitoring_tool: c.monitoring_tool.clone(),
            custom_fields: key_values(&c.custom_fields),
            extra: am::Extra::new(),
        })
    }

    fn pushover(&mut self, c: &tenant::PushoverConfig, path: &FieldPath) -> Result<am::PushoverConfig> {
        let user_key = self.required_secret(c.user_key.as_ref(), &path.field("userKey"), "userKey")?;
        let token = self.required_secret(c.token.as_ref(), &path.field("token"), "token")?;

        Ok(am::PushoverConfig {
            send_resolved: c.send_resolved,
            http_config: self.http_config(c.http_config.as_ref(), path)?,
            user_key: Some(user_key),
            token: Some(token),
            title: c.title.clone(),
            message: c.message.clone(),
            url: c.url.clone(),
            url_title: c.url_title.clone(),
            sound: c.sound.clone(),
            priority: c.priority.clone(),
            retry: c.retry.clone(),
            expire: c.expire.clone(),
            html: c.html,
            extra: am::Extra::new(),
        })
    }
}
