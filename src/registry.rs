use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::citation::{is_absolute_url, normalize_path};
use crate::util::{read_json_file, sha256_file};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, alias = "doc-type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default, alias = "experience_league_url", alias = "url")]
    pub canonical_url: String,
    #[serde(default, alias = "github_url")]
    pub backup_url: Option<String>,
    #[serde(default, alias = "last_modified_s3")]
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub version: Option<String>,
    pub sha256: Option<String>,
    pub total_documents: usize,
    pub skipped_entries: usize,
    pub products: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    version: Option<String>,
    sha256: Option<String>,
    entries: HashMap<String, RegistryEntry>,
    skipped_entries: usize,
}

impl MetadataRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let value = read_json_file(path)?;
        let mut registry = Self::from_json(value)
            .with_context(|| format!("invalid metadata registry: {}", path.display()))?;
        registry.sha256 = Some(sha256_file(path)?);

        info!(
            path = %path.display(),
            version = %registry.version.as_deref().unwrap_or("unversioned"),
            documents = registry.len(),
            skipped = registry.skipped_entries,
            "loaded metadata registry"
        );
        Ok(registry)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            bail!("metadata registry must be a json object");
        };

        let (version, documents) = match object.remove("documents") {
            Some(Value::Object(documents)) => {
                let version = object.get("version").and_then(|value| match value {
                    Value::String(raw) => Some(raw.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                });
                (version, documents)
            }
            Some(_) => bail!("metadata registry 'documents' must be a json object"),
            None => (None, object),
        };

        let mut registry = Self::from_documents(documents);
        registry.version = version;
        Ok(registry)
    }

    #[cfg(test)]
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, RegistryEntry)>,
        K: AsRef<str>,
    {
        let mut registry = Self::default();
        for (key, entry) in entries {
            registry.insert(key.as_ref(), entry);
        }
        registry
    }

    pub fn get(&self, normalized_path: &str) -> Option<&RegistryEntry> {
        self.entries.get(normalized_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut products = BTreeMap::<String, usize>::new();
        for entry in self.entries.values() {
            let product = entry.product.as_deref().unwrap_or("Unknown");
            *products.entry(product.to_string()).or_default() += 1;
        }

        RegistryStats {
            version: self.version.clone(),
            sha256: self.sha256.clone(),
            total_documents: self.entries.len(),
            skipped_entries: self.skipped_entries,
            products,
        }
    }

    fn from_documents(documents: Map<String, Value>) -> Self {
        let mut registry = Self::default();
        for (key, raw) in documents {
            match serde_json::from_value::<RegistryEntry>(raw) {
                Ok(entry) => registry.insert(&key, entry),
                Err(err) => {
                    warn!(key = %key, error = %err, "skipping unparsable registry entry");
                    registry.skipped_entries += 1;
                }
            }
        }
        registry
    }

    fn insert(&mut self, key: &str, mut entry: RegistryEntry) {
        let Some(path) = normalize_path(key) else {
            warn!(key = %key, "skipping registry entry with empty path");
            self.skipped_entries += 1;
            return;
        };

        entry.title = entry.title.trim().to_string();
        if entry.title.is_empty() || !is_absolute_url(&entry.canonical_url) {
            warn!(key = %key, "skipping registry entry without title or absolute url");
            self.skipped_entries += 1;
            return;
        }

        let normalized = path.normalized().to_string();
        if self.entries.contains_key(&normalized) {
            warn!(key = %key, normalized = %normalized, "duplicate registry path, keeping first");
            self.skipped_entries += 1;
            return;
        }
        self.entries.insert(normalized, entry);
    }
}
