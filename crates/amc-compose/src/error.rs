//! Error types for the amc-compose crate.

use std::fmt;

use thiserror::Error;

use crate::tenant::TenantKey;

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Location of a value inside a tenant spec, e.g. `receivers[0].webhookConfigs[1].url`.
///
/// Paths are built top-down while walking the spec so that every error can
/// point at the offending object without re-parsing the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Creates an empty path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Creates a path with a single field segment.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self(vec![Segment::Field(field.into())])
    }

    /// Returns a new path with `field` appended.
    #[must_use]
    pub fn field(&self, field: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(field.into()));
        Self(segments)
    }

    /// Returns a new path with an index appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{name}")?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A tenant spec is internally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    /// Where the problem was found.
    pub path: FieldPath,
    /// Why the value was rejected.
    pub reason: String,
}

impl ValidationError {
    /// Creates a validation error at `path`.
    pub fn new(path: &FieldPath, reason: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// A secret or configmap lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// The secret does not exist.
    #[error("secret {namespace}/{name} not found")]
    SecretNotFound {
        /// Namespace of the secret.
        namespace: String,
        /// Name of the secret.
        name: String,
    },

    /// The secret exists but does not hold the key.
    #[error("key {key:?} in secret {namespace}/{name} not found")]
    KeyNotFound {
        /// Namespace of the secret.
        namespace: String,
        /// Name of the secret.
        name: String,
        /// The missing key.
        key: String,
    },

    /// The configmap does not exist.
    #[error("configmap {namespace}/{name} not found")]
    ConfigMapNotFound {
        /// Namespace of the configmap.
        namespace: String,
        /// Name of the configmap.
        name: String,
    },

    /// The configmap exists but does not hold the key.
    #[error("key {key:?} in configmap {namespace}/{name} not found")]
    ConfigMapKeyNotFound {
        /// Namespace of the configmap.
        namespace: String,
        /// Name of the configmap.
        name: String,
        /// The missing key.
        key: String,
    },

    /// The secret value is not valid UTF-8 and cannot be inlined.
    #[error("key {key:?} in secret {namespace}/{name} is not valid UTF-8")]
    InvalidUtf8 {
        /// Namespace of the secret.
        namespace: String,
        /// Name of the secret.
        name: String,
        /// The offending key.
        key: String,
    },

    /// A TLS selector names neither a secret nor a configmap.
    #[error("empty TLS asset selector")]
    EmptySelector,
}

/// Errors that can occur while composing an Alertmanager configuration.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The tenant failed semantic validation.
    #[error("tenant {tenant}: {source}")]
    Validation {
        /// The rejected tenant.
        tenant: TenantKey,
        /// What was wrong with it.
        #[source]
        source: ValidationError,
    },

    /// A secret referenced by the tenant could not be resolved.
    #[error("tenant {tenant}: {path}: {source}")]
    SecretResolution {
        /// The tenant referencing the secret.
        tenant: TenantKey,
        /// The field holding the selector.
        path: FieldPath,
        /// The lookup failure.
        #[source]
        source: SecretError,
    },

    /// A receiver could not be converted to the upstream schema.
    #[error("tenant {tenant}: {path}: {reason}")]
    InvalidReceiver {
        /// The tenant owning the receiver.
        tenant: TenantKey,
        /// The offending field.
        path: FieldPath,
        /// Why the conversion failed.
        reason: String,
    },

    /// A time interval could not be converted to the upstream schema.
    #[error("tenant {tenant}: {source}")]
    InvalidTimeInterval {
        /// The tenant owning the interval.
        tenant: TenantKey,
        /// The offending range.
        #[source]
        source: ValidationError,
    },

    /// The base configuration is unusable.
    #[error("invalid base configuration: {reason}")]
    InvalidBaseConfig {
        /// Why the base was rejected.
        reason: String,
    },

    /// The composed configuration would be refused by Alertmanager.
    #[error("invalid composed configuration: {reason}")]
    InvalidConfig {
        /// Why the result was rejected.
        reason: String,
    },

    /// YAML encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for ComposeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl ComposeError {
    /// Returns the tenant the error belongs to, if any.
    #[must_use]
    pub const fn tenant(&self) -> Option<&TenantKey> {
        match self {
            Self::Validation { tenant, .. }
            | Self::SecretResolution { tenant, .. }
            | Self::InvalidReceiver { tenant, .. }
            | Self::InvalidTimeInterval { tenant, .. } => Some(tenant),
            _ => None,
        }
    }
}

/// Result type for composition operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_display() {
        let path = FieldPath::new("receivers")
            .index(0)
            .field("webhookConfigs")
            .index(2)
            .field("url");
        assert_eq!(path.to_string(), "receivers[0].webhookConfigs[2].url");
    }

    #[test]
    fn field_path_root_is_empty() {
        assert!(FieldPath::root().is_empty());
        assert_eq!(FieldPath::root().to_string(), "");
        assert_eq!(FieldPath::root().index(3).to_string(), "[3]");
    }

    #[test]
    fn validation_error_display_with_path() {
        let err = ValidationError::new(&FieldPath::new("route").field("routes").index(1), "boom");
        assert_eq!(err.to_string(), "route.routes[1]: boom");
    }

    #[test]
    fn validation_error_display_without_path() {
        let err = ValidationError::new(&FieldPath::root(), "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn secret_error_display() {
        let err = SecretError::KeyNotFound {
            namespace: "ns".to_string(),
            name: "creds".to_string(),
            key: "token".to_string(),
        };
        assert_eq!(err.to_string(), "key \"token\" in secret ns/creds not found");
    }

    #[test]
    fn compose_error_names_tenant_and_secret() {
        let err = ComposeError::SecretResolution {
            tenant: TenantKey::new("ns", "amc"),
            path: FieldPath::new("receivers").index(0).field("routingKey"),
            source: SecretError::SecretNotFound {
                namespace: "ns".to_string(),
                name: "pd".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "tenant ns/amc: receivers[0].routingKey: secret ns/pd not found"
        );
        assert_eq!(err.tenant(), Some(&TenantKey::new("ns", "amc")));
    }

    #[test]
    fn compose_error_from_serde_yaml() {
        let yaml_err = serde_yaml::from_str::<u32>("not a number");
        assert!(yaml_err.is_err());
        let err: ComposeError = yaml_err.unwrap_err().into();
        assert!(matches!(err, ComposeError::Serialization(_)));
        assert!(err.tenant().is_none());
    }
}
