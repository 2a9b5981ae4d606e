//! Dry-run diffing between a bundle and the live store

use crate::applier::{config_key, ApplyError};
use confgen_context::ConfigStore;
use confgen_domain::{Bundle, Domain};
use serde_json::Value as JsonValue;

/// Pending change for one domain
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DomainDiff {
    /// Domain the change targets
    pub domain: Domain,
    /// Live store value, if any
    pub current: Option<JsonValue>,
    /// Value the bundle would write
    pub proposed: JsonValue,
    /// Dotted paths whose values differ
    pub changed_paths: Vec<String>,
}

impl DomainDiff {
    /// True when the write would change nothing
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed_paths.is_empty()
    }
}

/// Per-domain diff of a bundle against the live store
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct BundleDiff {
    pub domains: Vec<DomainDiff>,
}

impl BundleDiff {
    /// Compare a bundle with the store's current values
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Store`] if a current value cannot be read, or
    /// [`ApplyError::Domain`] if a config cannot be encoded.
    pub async fn compute(store: &dyn ConfigStore, bundle: &Bundle) -> Result<Self, ApplyError> {
        let mut domains = Vec::with_capacity(bundle.len());
        for (domain, config) in bundle.iter() {
            let proposed = config.to_value()?;
            let current = store.get(&config_key(domain)).await?;

            let mut changed_paths = Vec::new();
            match &current {
                Some(current) => collect_changes("", current, &proposed, &mut changed_paths),
                None => changed_paths.push(String::new()),
            }

            domains.push(DomainDiff {
                domain,
                current,
                proposed,
                changed_paths,
            });
        }
        Ok(Self { domains })
    }

    /// Domains whose write would change the store
    #[must_use]
    pub fn changed_domains(&self) -> Vec<Domain> {
        self.domains
            .iter()
            .filter(|d| !d.is_noop())
            .map(|d| d.domain)
            .collect()
    }
}

/// Walk both values, recording paths that differ
///
/// Objects recurse per key; anything else compares whole. Keys present on
/// only one side count as changed.
fn collect_changes(prefix: &str, current: &JsonValue, proposed: &JsonValue, out: &mut Vec<String>) {
    match (current, proposed) {
        (JsonValue::Object(cur), JsonValue::Object(prop)) => {
            for (key, prop_value) in prop {
                let path = join_path(prefix, key);
                match cur.get(key) {
                    Some(cur_value) => collect_changes(&path, cur_value, prop_value, out),
                    None => out.push(path),
                }
            }
            for key in cur.keys() {
                if !prop.contains_key(key) {
                    out.push(join_path(prefix, key));
                }
            }
        }
        _ => {
            if current != proposed {
                out.push(prefix.to_string());
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
