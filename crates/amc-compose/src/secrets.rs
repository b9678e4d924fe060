//! Secret and TLS material resolution.
//!
//! Receivers reference credentials through selectors; composition inlines
//! the referenced values. TLS material is never inlined: the output points at
//! a file path derived from the selector, and the caller is responsible for
//! mounting the bytes at that path (see [`SecretStore::tls_asset`]).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::SecretError;
use crate::tenant::{SecretKeySelector, SecretOrConfigMap};

/// Read-only access to secrets and configmaps of tenant namespaces.
///
/// Implementations must be safe to share between concurrent compositions.
pub trait SecretResolver: Send + Sync {
    /// Returns the value stored under `selector.key` in the named secret.
    fn get_secret_key(
        &self,
        namespace: &str,
        selector: &SecretKeySelector,
    ) -> Result<String, SecretError>;

    /// Returns the path at which the TLS asset behind `selector` is mounted.
    ///
    /// The path depends only on the selector identity, so the same reference
    /// always yields the same path.
    fn tls_asset_path(
        &self,
        dir: &Path,
        namespace: &str,
        selector: &SecretOrConfigMap,
    ) -> Result<String, SecretError> {
        let key = TlsAssetKey::from_selector(namespace, selector)?;
        Ok(key.path_in(dir))
    }
}

/// Where a TLS asset comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TlsAssetSource {
    /// A secret.
    Secret,
    /// A configmap.
    ConfigMap,
}

impl TlsAssetSource {
    /// Returns the prefix used in asset keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::ConfigMap => "configmap",
        }
    }
}

impl fmt::Display for TlsAssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a TLS asset; doubles as its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TlsAssetKey {
    /// Secret or configmap.
    pub from: TlsAssetSource,
    /// Namespace of the object.
    pub namespace: String,
    /// Name of the object.
    pub name: String,
    /// Key within the object.
    pub key: String,
}

impl TlsAssetKey {
    /// Builds the key for a secret-or-configmap selector.
    ///
    /// When both sources are set the secret wins; validation rejects that
    /// combination before composition.
    pub fn from_selector(namespace: &str, selector: &SecretOrConfigMap) -> Result<Self, SecretError> {
        match (&selector.secret, &selector.config_map) {
            (Some(secret), _) => Ok(Self::from_secret(namespace, secret)),
            (None, Some(cm)) => Ok(Self {
                from: TlsAssetSource::ConfigMap,
                namespace: namespace.to_string(),
                name: cm.name.clone(),
                key: cm.key.clone(),
            }),
            (None, None) => Err(SecretError::EmptySelector),
        }
    }

    /// Builds the key for a secret selector.
    #[must_use]
    pub fn from_secret(namespace: &str, selector: &SecretKeySelector) -> Self {
        Self {
            from: TlsAssetSource::Secret,
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        }
    }

    /// Returns the asset path below `dir`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> String {
        dir.join(self.to_string()).to_string_lossy().into_owned()
    }
}

impl fmt::Display for TlsAssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.from, self.namespace, self.name, self.key)
    }
}

type ObjectKey = (String, String);

/// In-memory secret and configmap store.
///
/// Populated once before composition and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    secrets: HashMap<ObjectKey, BTreeMap<String, Vec<u8>>>,
    config_maps: HashMap<ObjectKey, BTreeMap<String, String>>,
}

impl SecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a secret.
    pub fn insert_secret<K, V>(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.secrets.insert((namespace.into(), name.into()), data);
    }

    /// Adds (or replaces) a configmap.
    pub fn insert_config_map<K, V>(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.config_maps.insert((namespace.into(), name.into()), data);
    }

    /// Builder form of [`SecretStore::insert_secret`].
    #[must_use]
    pub fn with_secret<K, V>(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.insert_secret(namespace, name, data);
        self
    }

    /// Builder form of [`SecretStore::insert_config_map`].
    #[must_use]
    pub fn with_config_map<K, V>(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert_config_map(namespace, name, data);
        self
    }

    /// Number of secrets held.
    #[must_use]
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }

    /// Number of configmaps held.
    #[must_use]
    pub fn config_map_count(&self) -> usize {
        self.config_maps.len()
    }

    fn secret_bytes(&self, namespace: &str, name: &str, key: &str) -> Result<&[u8], SecretError> {
        let data = self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| SecretError::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;
        data.get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| SecretError::KeyNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
                key: key.to_string(),
            })
    }

    /// Returns the value stored under `key` in a configmap.
    pub fn get_config_map_key(&self, namespace: &str, name: &str, key: &str) -> Result<&str, SecretError> {
        let data = self
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| SecretError::ConfigMapNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;
        data.get(key)
            .map(String::as_str)
            .ok_or_else(|| SecretError::ConfigMapKeyNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
                key: key.to_string(),
            })
    }

    /// Returns the bytes behind a TLS asset so the caller can mount them.
    pub fn tls_asset(&self, asset: &TlsAssetKey) -> Result<Vec<u8>, SecretError> {
        match asset.from {
            TlsAssetSource::Secret => self
                .secret_bytes(&asset.namespace, &asset.name, &asset.key)
                .map(<[u8]>::to_vec),
            TlsAssetSource::ConfigMap => self
                .get_config_map_key(&asset.namespace, &asset.name, &asset.key)
                .map(|v| v.as_bytes().to_vec()),
        }
    }
}

impl SecretResolver for SecretStore {
    fn get_secret_key(
        &self,
        namespace: &str,
        selector: &SecretKeySelector,
    ) -> Result<String, SecretError> {
        let bytes = self.secret_bytes(namespace, &selector.name, &selector.key)?;
        let value = String::from_utf8(bytes.to_vec()).map_err(|_| SecretError::InvalidUtf8 {
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        })?;

        debug!(
            namespace = %namespace,
            secret = %selector.name,
            key = %selector.key,
            "resolved secret key"
        );
        Ok(value)
    }
}
