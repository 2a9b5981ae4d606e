//! Component registry
//!
//! Components register a [`ComponentDescriptor`] at startup; the context
//! provider only reads the registry. This replaces presence-probing of
//! subsystem symbols with explicit registration.

use crate::types::{ComponentDescriptor, ComponentId};
use async_trait::async_trait;
use dashmap::DashMap;

/// Registry errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Registry backend unreachable
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    /// Component not registered
    #[error("component not registered: {0}")]
    NotRegistered(ComponentId),
}

/// Read seam over the platform's component registry
#[async_trait]
pub trait ComponentRegistry: Send + Sync {
    /// List all registered components, in registration order
    async fn list_components(&self) -> Result<Vec<ComponentDescriptor>, RegistryError>;
}

/// In-memory component registry
///
/// Registration order is preserved so collected contexts are stable.
#[derive(Debug, Default)]
pub struct InMemoryComponentRegistry {
    components: DashMap<ComponentId, ComponentDescriptor>,
    order: std::sync::Mutex<Vec<ComponentId>>,
}

impl InMemoryComponentRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component (replaces any prior registration for the same id)
    pub fn register(&self, descriptor: ComponentDescriptor) {
        let mut order = self.order.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !order.contains(&descriptor.id) {
            order.push(descriptor.id.clone());
        }
        drop(order);
        self.components.insert(descriptor.id.clone(), descriptor);
    }

    /// Flip a registered component's active flag
    ///
    /// Returns false when the component is not registered.
    pub fn set_active(&self, id: &ComponentId, active: bool) -> bool {
        match self.components.get_mut(id) {
            Some(mut entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// Number of registered components
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[async_trait]
impl ComponentRegistry for InMemoryComponentRegistry {
    async fn list_components(&self) -> Result<Vec<ComponentDescriptor>, RegistryError> {
        let order = self
            .order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        Ok(order
            .into_iter()
            .filter_map(|id| self.components.get(&id).map(|c| c.clone()))
            .collect())
    }
}
