//! Snapshot types for live platform state
//!
//! Everything here is immutable once collected: the provider builds a
//! [`SystemContext`] and hands it out behind an `Arc`; consumers only read.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Unique component identifier (stable string key, e.g. "engine-hub")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a component id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Descriptor for a registered platform component
///
/// Owned by the registry; the context provider only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Component id
    pub id: ComponentId,
    /// Whether the component is currently active
    pub active: bool,
    /// Declared capability names
    pub capabilities: Vec<String>,
    /// Current stored configuration (opaque)
    #[serde(default)]
    pub config: JsonValue,
    /// Declared endpoint/option surface
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl ComponentDescriptor {
    /// Create a descriptor for an active component with no capabilities
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<ComponentId>) -> Self {
        Self {
            id: id.into(),
            active: true,
            capabilities: Vec::new(),
            config: JsonValue::Null,
            endpoints: Vec::new(),
        }
    }

    /// Set the active flag
    #[inline]
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Add a declared capability
    #[inline]
    #[must_use]
    pub fn with_capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    /// Set the stored configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: JsonValue) -> Self {
        self.config = config;
        self
    }

    /// Add a declared endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.push(endpoint.into());
        self
    }

    /// Whether the component declares a capability
    #[inline]
    #[must_use]
    pub fn declares(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

impl From<ComponentId> for ComponentDescriptor {
    fn from(id: ComponentId) -> Self {
        Self::new(id)
    }
}

/// Descriptor for a single capability, derived from component declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Capability name
    pub name: String,
    /// Owning component
    pub component: ComponentId,
    /// Whether the capability is currently usable (owner active)
    pub available: bool,
    /// Human description
    pub description: String,
}

/// Storage-related facts collected from the context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Backends currently usable for primary storage
    pub available_backends: Vec<String>,
    /// Whether a CDN-like secondary store is configured
    pub cdn_configured: bool,
}

/// Aggregate statistics over a collected snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextStats {
    /// Total registered components
    pub components_total: usize,
    /// Components with `active == true`
    pub components_active: usize,
    /// Total declared capabilities
    pub capabilities_total: usize,
    /// Components that had stored configuration
    pub components_configured: usize,
    /// When the snapshot was collected
    pub collected_at: DateTime<Utc>,
}

/// Immutable snapshot of the live platform state
///
/// Created fresh per collection (cached for a short TTL by the provider);
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemContext {
    components: IndexMap<ComponentId, ComponentDescriptor>,
    capabilities: IndexMap<String, CapabilityDescriptor>,
    storage: StorageInfo,
    stats: ContextStats,
}

impl SystemContext {
    /// Build a context from collected components and storage facts
    ///
    /// Capability descriptors and statistics are derived here so the snapshot
    /// is internally consistent by construction.
    #[must_use]
    pub fn from_components(components: Vec<ComponentDescriptor>, storage: StorageInfo) -> Self {
        let mut capabilities = IndexMap::new();
        let mut configured = 0usize;
        let mut active = 0usize;

        for component in &components {
            if component.active {
                active += 1;
            }
            if !component.config.is_null() {
                configured += 1;
            }
            for name in &component.capabilities {
                capabilities.insert(
                    name.clone(),
                    CapabilityDescriptor {
                        name: name.clone(),
                        component: component.id.clone(),
                        available: component.active,
                        description: format!("{name} (provided by {})", component.id),
                    },
                );
            }
        }

        let stats = ContextStats {
            components_total: components.len(),
            components_active: active,
            capabilities_total: capabilities.len(),
            components_configured: configured,
            collected_at: Utc::now(),
        };

        Self {
            components: components.into_iter().map(|c| (c.id.clone(), c)).collect(),
            capabilities,
            storage,
            stats,
        }
    }

    /// Look up a component by id
    #[inline]
    #[must_use]
    pub fn component(&self, id: &ComponentId) -> Option<&ComponentDescriptor> {
        self.components.get(id)
    }

    /// Whether a component is registered and active
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: &ComponentId) -> bool {
        self.components.get(id).is_some_and(|c| c.active)
    }

    /// Whether a capability is available (declared by an active component)
    #[inline]
    #[must_use]
    pub fn capability_available(&self, name: &str) -> bool {
        self.capabilities.get(name).is_some_and(|c| c.available)
    }

    /// All components, in registration order
    #[inline]
    #[must_use]
    pub fn components(&self) -> &IndexMap<ComponentId, ComponentDescriptor> {
        &self.components
    }

    /// All capabilities, keyed by name
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &IndexMap<String, CapabilityDescriptor> {
        &self.capabilities
    }

    /// Storage facts
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &StorageInfo {
        &self.storage
    }

    /// Snapshot statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ContextStats {
        &self.stats
    }

    /// Ids of active components declaring a capability
    #[must_use]
    pub fn providers_of(&self, capability: &str) -> Vec<&ComponentId> {
        self.components
            .values()
            .filter(|c| c.active && c.declares(capability))
            .map(|c| &c.id)
            .collect()
    }

    /// Known peer addresses, read from the peer-network component's stored config
    ///
    /// Returns an empty list when no peer-network component is registered or its
    /// config carries no `peers` array.
    #[must_use]
    pub fn known_peers(&self) -> Vec<String> {
        self.components
            .values()
            .filter(|c| c.active && c.declares("peer-network"))
            .filter_map(|c| c.config.get("peers"))
            .filter_map(|peers| peers.as_array())
            .flat_map(|peers| peers.iter().filter_map(|p| p.as_str()))
            .map(str::to_string)
            .collect()
    }
}
