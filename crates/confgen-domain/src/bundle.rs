//! Configuration bundles
//!
//! A [`Bundle`] maps domains to their synthesized configs, in resolution
//! order. JSON is the authoritative serialized form; YAML is offered as a
//! secondary text form. Equality of bundles is equality of canonical JSON,
//! summarized by a blake3 fingerprint.

use crate::config::{canonical_json, DomainConfig};
use crate::domain::{Domain, DomainError};
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Serialization errors for bundles
#[derive(Debug, thiserror::Error)]
pub enum BundleCodecError {
    /// JSON encode/decode failure
    #[error("bundle JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encode/decode failure
    #[error("bundle YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Domain-level failure inside the bundle
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// An ordered set of per-domain configurations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    configs: IndexMap<Domain, DomainConfig>,
}

impl Bundle {
    /// Create an empty bundle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a domain's config; keyed by the config's own domain
    pub fn insert(&mut self, config: DomainConfig) {
        self.configs.insert(config.domain(), config);
    }

    /// Get a domain's config
    #[inline]
    #[must_use]
    pub fn get(&self, domain: Domain) -> Option<&DomainConfig> {
        self.configs.get(&domain)
    }

    /// Mutable access to a domain's config
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self, domain: Domain) -> Option<&mut DomainConfig> {
        self.configs.get_mut(&domain)
    }

    /// Whether the bundle contains a domain
    #[inline]
    #[must_use]
    pub fn contains(&self, domain: Domain) -> bool {
        self.configs.contains_key(&domain)
    }

    /// Domains in the bundle, in insertion order
    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        self.configs.keys().copied().collect()
    }

    /// Iterate over the configs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Domain, &DomainConfig)> {
        self.configs.iter().map(|(d, c)| (*d, c))
    }

    /// Number of domains
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the bundle is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Encode to the authoritative JSON form
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] if encoding fails.
    pub fn to_json(&self) -> Result<String, BundleCodecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from the authoritative JSON form
    ///
    /// An unknown domain key fails fast; it is never a validation issue.
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self, BundleCodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode to YAML
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] if encoding fails.
    pub fn to_yaml(&self) -> Result<String, BundleCodecError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Decode from YAML
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] on malformed input.
    pub fn from_yaml(yaml: &str) -> Result<Self, BundleCodecError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Canonical JSON (sorted keys at every level)
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] if a config fails to encode.
    pub fn canonical(&self) -> Result<String, BundleCodecError> {
        let mut map = serde_json::Map::new();
        for (domain, config) in &self.configs {
            map.insert(domain.as_str().to_string(), config.to_value()?);
        }
        Ok(canonical_json(&JsonValue::Object(map)))
    }

    /// Blake3 fingerprint over the canonical JSON, hex-encoded
    ///
    /// Two bundles with the same fingerprint hold the same configuration.
    ///
    /// # Errors
    /// Returns [`BundleCodecError`] if a config fails to encode.
    pub fn fingerprint(&self) -> Result<String, BundleCodecError> {
        let canonical = self.canonical()?;
        Ok(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }
}

impl FromIterator<DomainConfig> for Bundle {
    fn from_iter<I: IntoIterator<Item = DomainConfig>>(iter: I) -> Self {
        let mut bundle = Bundle::new();
        for config in iter {
            bundle.insert(config);
        }
        bundle
    }
}

impl Serialize for Bundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.configs.len()))?;
        for (domain, config) in &self.configs {
            let value = config.to_value().map_err(serde::ser::Error::custom)?;
            map.serialize_entry(domain.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BundleVisitor;

        impl<'de> Visitor<'de> for BundleVisitor {
            type Value = Bundle;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of domain name to domain config")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Bundle, A::Error> {
                let mut bundle = Bundle::new();
                while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
                    let domain = Domain::from_str(&key).map_err(serde::de::Error::custom)?;
                    let config = DomainConfig::from_value(domain, value)
                        .map_err(serde::de::Error::custom)?;
                    bundle.insert(config);
                }
                Ok(bundle)
            }
        }

        deserializer.deserialize_map(BundleVisitor)
    }
}
