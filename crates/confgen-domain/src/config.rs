//! Tagged union over the per-domain config structs
//!
//! [`DomainConfig`] is the value the synthesis pipeline carries: typed per
//! domain, convertible to and from the stored JSON form, deep-mergeable with
//! caller overrides.

use crate::configs::{
    ComputeEnginesConfig, MemoryConfig, NetworkConfig, SecurityConfig, StorageConfig,
    WorkflowConfig,
};
use crate::domain::{Domain, DomainError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A typed configuration for one domain
#[derive(Debug, Clone, PartialEq)]
pub enum DomainConfig {
    /// Compute engines
    ComputeEngines(ComputeEnginesConfig),
    /// Storage
    Storage(StorageConfig),
    /// Memory
    Memory(MemoryConfig),
    /// Workflow
    Workflow(WorkflowConfig),
    /// Security
    Security(SecurityConfig),
    /// Network
    Network(NetworkConfig),
}

impl DomainConfig {
    /// The domain this config belongs to
    #[inline]
    #[must_use]
    pub const fn domain(&self) -> Domain {
        match self {
            DomainConfig::ComputeEngines(_) => Domain::ComputeEngines,
            DomainConfig::Storage(_) => Domain::Storage,
            DomainConfig::Memory(_) => Domain::Memory,
            DomainConfig::Workflow(_) => Domain::Workflow,
            DomainConfig::Security(_) => Domain::Security,
            DomainConfig::Network(_) => Domain::Network,
        }
    }

    /// Encode to the stored JSON form
    ///
    /// # Errors
    /// Returns [`DomainError::Codec`] if encoding fails (rare for these types).
    pub fn to_value(&self) -> Result<JsonValue, DomainError> {
        fn encode<T: Serialize>(domain: Domain, config: &T) -> Result<JsonValue, DomainError> {
            serde_json::to_value(config).map_err(|e| DomainError::Codec {
                domain,
                reason: e.to_string(),
            })
        }

        match self {
            DomainConfig::ComputeEngines(c) => encode(Domain::ComputeEngines, c),
            DomainConfig::Storage(c) => encode(Domain::Storage, c),
            DomainConfig::Memory(c) => encode(Domain::Memory, c),
            DomainConfig::Workflow(c) => encode(Domain::Workflow, c),
            DomainConfig::Security(c) => encode(Domain::Security, c),
            DomainConfig::Network(c) => encode(Domain::Network, c),
        }
    }

    /// Decode the stored JSON form for a domain
    ///
    /// # Errors
    /// Returns [`DomainError::Codec`] when the value does not match the
    /// domain's shape.
    pub fn from_value(domain: Domain, value: JsonValue) -> Result<Self, DomainError> {
        fn decode<T: DeserializeOwned>(domain: Domain, value: JsonValue) -> Result<T, DomainError> {
            serde_json::from_value(value).map_err(|e| DomainError::Codec {
                domain,
                reason: e.to_string(),
            })
        }

        Ok(match domain {
            Domain::ComputeEngines => DomainConfig::ComputeEngines(decode(domain, value)?),
            Domain::Storage => DomainConfig::Storage(decode(domain, value)?),
            Domain::Memory => DomainConfig::Memory(decode(domain, value)?),
            Domain::Workflow => DomainConfig::Workflow(decode(domain, value)?),
            Domain::Security => DomainConfig::Security(decode(domain, value)?),
            Domain::Network => DomainConfig::Network(decode(domain, value)?),
        })
    }

    /// Deep-merge a JSON overlay into this config
    ///
    /// Maps merge recursively; scalars and arrays from the overlay win.
    ///
    /// # Errors
    /// Returns [`DomainError::Codec`] when the merged value no longer matches
    /// the domain's shape.
    pub fn merge_value(&self, overlay: &JsonValue) -> Result<Self, DomainError> {
        let merged = merge_json(&self.to_value()?, overlay);
        Self::from_value(self.domain(), merged)
    }

    /// Canonical JSON string (sorted keys), used for equality and hashing
    ///
    /// # Errors
    /// Returns [`DomainError::Codec`] if encoding fails.
    pub fn canonical(&self) -> Result<String, DomainError> {
        Ok(canonical_json(&self.to_value()?))
    }

    /// Borrow as compute-engines config
    #[inline]
    #[must_use]
    pub fn as_compute_engines(&self) -> Option<&ComputeEnginesConfig> {
        match self {
            DomainConfig::ComputeEngines(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as storage config
    #[inline]
    #[must_use]
    pub fn as_storage(&self) -> Option<&StorageConfig> {
        match self {
            DomainConfig::Storage(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as memory config
    #[inline]
    #[must_use]
    pub fn as_memory(&self) -> Option<&MemoryConfig> {
        match self {
            DomainConfig::Memory(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as workflow config
    #[inline]
    #[must_use]
    pub fn as_workflow(&self) -> Option<&WorkflowConfig> {
        match self {
            DomainConfig::Workflow(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as security config
    #[inline]
    #[must_use]
    pub fn as_security(&self) -> Option<&SecurityConfig> {
        match self {
            DomainConfig::Security(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as network config
    #[inline]
    #[must_use]
    pub fn as_network(&self) -> Option<&NetworkConfig> {
        match self {
            DomainConfig::Network(c) => Some(c),
            _ => None,
        }
    }
}

/// Deep-merge two JSON values
///
/// Objects merge key-by-key recursively; for scalars and arrays the overlay
/// wins. Array replacement (rather than concatenation) keeps override
/// application idempotent.
#[must_use]
pub fn merge_json(base: &JsonValue, overlay: &JsonValue) -> JsonValue {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_val) in overlay_map {
                let merged = match result.get(key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => overlay_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            JsonValue::Object(result)
        }
        (_, overlay_val) => overlay_val.clone(),
    }
}

/// Canonical JSON rendering with sorted object keys
#[must_use]
pub fn canonical_json(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            let mut parts = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(val) = map.get(key) {
                    parts.push(format!("\"{}\":{}", key, canonical_json(val)));
                }
            }
            format!("{{{}}}", parts.join(","))
        }
        JsonValue::Array(arr) => {
            let parts: Vec<_> = arr.iter().map(canonical_json).collect();
            format!("[{}]", parts.join(","))
        }
        // Scalars already have a canonical serde_json rendering
        other => other.to_string(),
    }
}
