//! Composition of a base configuration with tenant configurations.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::alertmanager::{self as am, AlertmanagerConfig, GlobalConfig};
use crate::error::{ComposeError, FieldPath, Result};
use crate::inhibit::convert_inhibit_rule;
use crate::receivers::ReceiverCompiler;
use crate::intervals::convert_time_interval;
use crate::routes::{convert_route, MatcherStrategy};
use crate::secrets::{SecretResolver, TlsAssetKey};
use crate::tenant::{TenantConfig, TenantKey};
use crate::validation::validate_tenant;

/// Default directory TLS assets are mounted in.
pub const DEFAULT_TLS_ASSETS_DIR: &str = "/etc/alertmanager/certs";

/// Configuration for [`ConfigComposer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Directory TLS file paths are generated under.
    pub tls_assets_dir: PathBuf,
    /// Whether tenants are validated before compilation.
    pub validate_tenants: bool,
    /// How tenant routes and inhibition rules are confined.
    pub matcher_strategy: MatcherStrategy,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            tls_assets_dir: PathBuf::from(DEFAULT_TLS_ASSETS_DIR),
            validate_tenants: true,
            matcher_strategy: MatcherStrategy::default(),
        }
    }
}

impl ComposerConfig {
    /// Sets the TLS assets directory.
    #[must_use]
    pub fn with_tls_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tls_assets_dir = dir.into();
        self
    }

    /// Sets the matcher strategy.
    #[must_use]
    pub fn with_matcher_strategy(mut self, strategy: MatcherStrategy) -> Self {
        self.matcher_strategy = strategy;
        self
    }

    /// Disables tenant validation.
    #[must_use]
    pub fn without_validation(mut self) -> Self {
        self.validate_tenants = false;
        self
    }
}

/// Result of a composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// The composed configuration.
    pub config: AlertmanagerConfig,
    /// TLS assets the configuration points at; the caller mounts them.
    pub tls_assets: BTreeSet<TlsAssetKey>,
    /// Tenants merged, in merge order.
    pub tenants: Vec<TenantKey>,
}

impl Composition {
    /// Serializes the composed configuration.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        self.config.to_yaml()
    }
}

/// A tenant left out by [`ConfigComposer::select`].
#[derive(Debug)]
pub struct RejectedTenant {
    /// Key of the tenant in the input map.
    pub key: String,
    /// Why it was rejected.
    pub error: ComposeError,
}

/// Outcome of [`ConfigComposer::select`].
#[derive(Debug, Default)]
pub struct TenantSelection {
    /// Tenants that compile cleanly.
    pub accepted: HashMap<String, TenantConfig>,
    /// Tenants that do not, sorted by key.
    pub rejected: Vec<RejectedTenant>,
}

/// Everything one tenant contributes.
struct CompiledTenant {
    route: Option<am::Route>,
    receivers: Vec<am::Receiver>,
    inhibit_rules: Vec<am::InhibitRule>,
    time_intervals: Vec<am::TimeInterval>,
    tls_assets: BTreeSet<TlsAssetKey>,
}

/// Merges a base configuration with tenant configurations.
///
/// Composition is a pure function of its inputs: tenants are merged in
/// lexicographic key order, the base is never modified, and any failure
/// aborts the whole composition.
pub struct ConfigComposer<'a> {
    resolver: &'a dyn SecretResolver,
    config: ComposerConfig,
}

impl<'a> ConfigComposer<'a> {
    /// Creates a composer with the default configuration.
    #[must_use]
    pub fn new(resolver: &'a dyn SecretResolver) -> Self {
        Self::with_config(resolver, ComposerConfig::default())
    }

    /// Creates a composer with the given configuration.
    #[must_use]
    pub fn with_config(resolver: &'a dyn SecretResolver, config: ComposerConfig) -> Self {
        Self { resolver, config }
    }

    /// Returns the composer configuration.
    #[must_use]
    pub const fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Composes and serializes the configuration.
    pub fn compose(
        &self,
        base: &AlertmanagerConfig,
        tenants: &HashMap<String, TenantConfig>,
    ) -> Result<Vec<u8>> {
        self.build(base, tenants)?.to_yaml()
    }

    /// Composes the configuration without serializing it.
    pub fn build(
        &self,
        base: &AlertmanagerConfig,
        tenants: &HashMap<String, TenantConfig>,
    ) -> Result<Composition> {
        let mut config = base.clone();
        if config.route.is_none() {
            return Err(ComposeError::InvalidBaseConfig {
                reason: "no route provided in config".to_string(),
            });
        }

        let mut keys: Vec<&String> = tenants.keys().collect();
        keys.sort();

        let mut subtrees = Vec::new();
        let mut tls_assets = BTreeSet::new();
        let mut merged = Vec::with_capacity(keys.len());

        for key in keys {
            let tenant = &tenants[key];
            let compiled = self.compile_tenant(tenant, base.global.as_ref())?;

            subtrees.extend(compiled.route);
            config.receivers.extend(compiled.receivers);
            config.inhibit_rules.extend(compiled.inhibit_rules);
            config.mute_time_intervals.extend(compiled.time_intervals);
            tls_assets.extend(compiled.tls_assets);
            merged.push(tenant.key().clone());
        }

        if let Some(route) = config.route.as_mut() {
            route.routes.extend(subtrees);
        }

        config.check()?;

        info!(
            tenants = merged.len(),
            receivers = config.receivers.len(),
            inhibit_rules = config.inhibit_rules.len(),
            time_intervals = config.mute_time_intervals.len(),
            tls_assets = tls_assets.len(),
            "composed alertmanager configuration"
        );

        Ok(Composition {
            config,
            tls_assets,
            tenants: merged,
        })
    }

    /// Splits tenants into those that compile and those that do not.
    ///
    /// Each tenant is validated and its receivers trial-compiled against the
    /// base configuration. Rejected tenants are logged and returned with
    /// their error so the caller can report them.
    pub fn select(
        &self,
        base: &AlertmanagerConfig,
        tenants: &HashMap<String, TenantConfig>,
    ) -> TenantSelection {
        let mut keys: Vec<&String> = tenants.keys().collect();
        keys.sort();

        let mut selection = TenantSelection::default();
        for key in keys {
            let tenant = &tenants[key];
            let outcome = Self::check_tenant(tenant)
                .and_then(|()| self.convert_tenant(tenant, base.global.as_ref()));

            match outcome {
                Ok(_) => {
                    selection.accepted.insert(key.clone(), tenant.clone());
                }
                Err(error) => {
                    warn!(tenant = %key, error = %error, "skipping invalid tenant configuration");
                    selection.rejected.push(RejectedTenant {
                        key: key.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            accepted = selection.accepted.len(),
            rejected = selection.rejected.len(),
            "selected tenant configurations"
        );
        selection
    }

    fn check_tenant(tenant: &TenantConfig) -> Result<()> {
        validate_tenant(tenant).map_err(|source| ComposeError::Validation {
            tenant: tenant.key().clone(),
            source,
        })
    }

    fn compile_tenant(&self, tenant: &TenantConfig, global: Option<&GlobalConfig>) -> Result<CompiledTenant> {
        if self.config.validate_tenants {
            Self::check_tenant(tenant)?;
        }
        self.convert_tenant(tenant, global)
    }

    fn convert_tenant(&self, tenant: &TenantConfig, global: Option<&GlobalConfig>) -> Result<CompiledTenant> {
        let key = tenant.key();
        let strategy = self.config.matcher_strategy;

        let route = tenant
            .spec
            .route
            .as_ref()
            .map(|route| convert_route(route, key, strategy, true));

        let mut compiler = ReceiverCompiler::new(self.resolver, key, &self.config.tls_assets_dir)
            .with_global(global);
        let receivers_path = FieldPath::new("receivers");
        let receivers = tenant
            .spec
            .receivers
            .iter()
            .enumerate()
            .map(|(i, receiver)| compiler.compile(receiver, &receivers_path.index(i)))
            .collect::<Result<Vec<_>>>()?;

        let inhibit_rules = tenant
            .spec
            .inhibit_rules
            .iter()
            .map(|rule| convert_inhibit_rule(rule, key, strategy))
            .collect();

        let intervals_path = FieldPath::new("muteTimeIntervals");
        let time_intervals = tenant
            .spec
            .mute_time_intervals
            .iter()
            .enumerate()
            .map(|(i, interval)| convert_time_interval(interval, key, &intervals_path.index(i)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            tenant = %key,
            has_route = route.is_some(),
            receivers = receivers.len(),
            time_intervals = time_intervals.len(),
            "compiled tenant"
        );

        Ok(CompiledTenant {
            route,
            receivers,
            inhibit_rules,
            time_intervals,
            tls_assets: compiler.into_tls_assets(),
        })
    }
}
