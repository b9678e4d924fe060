//! Loading command inputs from disk.
//!
//! Tenant files hold one or more YAML documents shaped like the custom
//! resource (`metadata.namespace`, `metadata.name`, `spec`). The secrets file
//! lists the secrets and configmaps tenants may reference:
//!
//! ```yaml
//! secrets:
//! - namespace: team-a
//!   name: pagerduty
//!   data:
//!     routingKey: s3cr3t
//! configMaps:
//! - namespace: team-a
//!   name: ca
//!   data:
//!     ca.crt: "-----BEGIN CERTIFICATE-----..."
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use amc_compose::{AlertmanagerConfig, SecretStore, TenantConfig};
use amc_relabel::RelabelConfig;

use crate::error::CliError;

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|e| CliError::input(path, e))
}

/// Loads the base Alertmanager configuration.
pub fn load_base(path: &Path) -> Result<AlertmanagerConfig, CliError> {
    AlertmanagerConfig::from_yaml(&read(path)?).map_err(|e| CliError::input(path, e))
}

/// Loads every tenant document from `paths`, keyed by `namespace/name`.
///
/// Empty documents are skipped. The same tenant appearing twice is an error.
pub fn load_tenants(paths: &[PathBuf]) -> Result<HashMap<String, TenantConfig>, CliError> {
    let mut tenants = HashMap::new();

    for path in paths {
        let bytes = read(path)?;
        for (index, document) in serde_yaml::Deserializer::from_slice(&bytes).enumerate() {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|e| CliError::input(path, format!("document {index}: {e}")))?;
            if value.is_null() {
                continue;
            }

            let tenant: TenantConfig = serde_yaml::from_value(value)
                .map_err(|e| CliError::input(path, format!("document {index}: {e}")))?;
            let key = tenant.key();
            if key.namespace.is_empty() || key.name.is_empty() {
                return Err(CliError::input(
                    path,
                    format!("document {index}: metadata.namespace and metadata.name are required"),
                ));
            }

            let key = key.to_string();
            if tenants.contains_key(&key) {
                return Err(CliError::input(path, format!("duplicate tenant {key}")));
            }
            tenants.insert(key, tenant);
        }
    }

    debug!(files = paths.len(), tenants = tenants.len(), "loaded tenant configurations");
    Ok(tenants)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SecretsFile {
    secrets: Vec<StoredObject>,
    config_maps: Vec<StoredObject>,
}

#[derive(Debug, Deserialize)]
struct StoredObject {
    namespace: String,
    name: String,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Loads the secrets file, or returns an empty store when none is given.
pub fn load_secrets(path: Option<&Path>) -> Result<SecretStore, CliError> {
    let mut store = SecretStore::new();
    let Some(path) = path else {
        return Ok(store);
    };

    let file: SecretsFile =
        serde_yaml::from_slice(&read(path)?).map_err(|e| CliError::input(path, e))?;
    for object in file.secrets {
        store.insert_secret(object.namespace, object.name, object.data);
    }
    for object in file.config_maps {
        store.insert_config_map(object.namespace, object.name, object.data);
    }

    debug!(
        secrets = store.secret_count(),
        config_maps = store.config_map_count(),
        "loaded secrets"
    );
    Ok(store)
}

/// Loads a YAML list of relabel rules.
pub fn load_relabel_rules(path: &Path) -> Result<Vec<RelabelConfig>, CliError> {
    serde_yaml::from_slice(&read(path)?).map_err(|e| CliError::input(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use amc_compose::{SecretKeySelector, SecretResolver};
    use tempfile::NamedTempFile;

    fn file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn multi_document_tenants() {
        let f = file(
            "metadata:\n  namespace: a\n  name: one\nspec:\n  receivers:\n  - name: x\n---\n---\nmetadata:\n  namespace: b\n  name: two\n",
        );
        let tenants = load_tenants(&[f.path().to_path_buf()]).unwrap();
        assert_eq!(tenants.len(), 2);
        assert_eq!(tenants["a/one"].spec.receivers[0].name, "x");
        assert!(tenants["b/two"].spec.route.is_none());
    }

    #[test]
    fn duplicate_tenant_across_files() {
        let doc = "metadata:\n  namespace: a\n  name: one\n";
        let (f1, f2) = (file(doc), file(doc));
        let err = load_tenants(&[f1.path().to_path_buf(), f2.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("duplicate tenant a/one"));
    }

    #[test]
    fn tenant_needs_identity() {
        let f = file("metadata:\n  namespace: a\n  name: ''\n");
        let err = load_tenants(&[f.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("metadata.name"));
    }

    #[test]
    fn secrets_file() {
        let f = file(
            "secrets:\n- namespace: ns\n  name: pd\n  data:\n    key: abc\nconfigMaps:\n- namespace: ns\n  name: ca\n  data:\n    ca.crt: PEM\n",
        );
        let store = load_secrets(Some(f.path())).unwrap();
        assert_eq!(store.secret_count(), 1);
        assert_eq!(store.config_map_count(), 1);
        assert_eq!(
            store
                .get_secret_key("ns", &SecretKeySelector::new("pd", "key"))
                .unwrap(),
            "abc"
        );
        assert_eq!(store.get_config_map_key("ns", "ca", "ca.crt").unwrap(), "PEM");
    }

    #[test]
    fn no_secrets_file() {
        let store = load_secrets(None).unwrap();
        assert_eq!(store.secret_count(), 0);
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_base(Path::new("/nonexistent/base.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("/nonexistent/base.yaml: "));
    }

    #[test]
    fn relabel_rules() {
        let f = file("- action: keep\n  sourceLabels: [job]\n  regex: api\n- targetLabel: x\n");
        let rules = load_relabel_rules(f.path()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].source_labels, vec!["job".to_string()]);
        assert_eq!(rules[1].target_label, "x");
    }
}
