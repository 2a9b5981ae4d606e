//! Context snapshot provider
//!
//! Collects registry and store state into an immutable [`SystemContext`],
//! cached under a fixed key with a short TTL so back-to-back synthesis
//! requests do not re-read the whole platform.

use crate::registry::{ComponentRegistry, RegistryError};
use crate::store::{ConfigStore, StoreError};
use crate::types::{StorageInfo, SystemContext};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Fixed cache key for the full-context snapshot
const CONTEXT_CACHE_KEY: &str = "full-context";

/// Default snapshot TTL (300 s)
pub const DEFAULT_CONTEXT_TTL: Duration = Duration::from_secs(300);

/// Store key carrying a component's live configuration
fn component_config_key(id: &str) -> String {
    format!("component:{id}")
}

/// Context collection errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContextError {
    /// Registry or store unreachable; synthesis must not proceed
    #[error("context unavailable: {0}")]
    Unavailable(String),
}

impl From<RegistryError> for ContextError {
    fn from(err: RegistryError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<StoreError> for ContextError {
    fn from(err: StoreError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Collects and caches [`SystemContext`] snapshots
///
/// Collection is a pure read: the provider never writes to the registry or
/// the store. The only internal state is the TTL cache.
#[derive(Clone)]
pub struct ContextProvider {
    registry: Arc<dyn ComponentRegistry>,
    store: Arc<dyn ConfigStore>,
    cache: Cache<&'static str, Arc<SystemContext>>,
}

impl std::fmt::Debug for ContextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProvider")
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl ContextProvider {
    /// Create a provider with the default 300 s TTL
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<dyn ComponentRegistry>, store: Arc<dyn ConfigStore>) -> Self {
        Self::with_ttl(registry, store, DEFAULT_CONTEXT_TTL)
    }

    /// Create a provider with an explicit snapshot TTL
    #[must_use]
    pub fn with_ttl(
        registry: Arc<dyn ComponentRegistry>,
        store: Arc<dyn ConfigStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Get the current context, served from cache within the TTL
    ///
    /// # Errors
    /// Returns [`ContextError::Unavailable`] when the registry or store
    /// cannot be reached.
    pub async fn context(&self) -> Result<Arc<SystemContext>, ContextError> {
        if let Some(cached) = self.cache.get(CONTEXT_CACHE_KEY).await {
            tracing::debug!("context served from cache");
            return Ok(cached);
        }

        let ctx = Arc::new(self.collect().await?);
        self.cache.insert(CONTEXT_CACHE_KEY, ctx.clone()).await;
        Ok(ctx)
    }

    /// Collect a fresh context, bypassing and repopulating the cache
    ///
    /// # Errors
    /// Returns [`ContextError::Unavailable`] when the registry or store
    /// cannot be reached.
    pub async fn refresh(&self) -> Result<Arc<SystemContext>, ContextError> {
        self.cache.invalidate(CONTEXT_CACHE_KEY).await;
        let ctx = Arc::new(self.collect().await?);
        self.cache.insert(CONTEXT_CACHE_KEY, ctx.clone()).await;
        Ok(ctx)
    }

    /// Collect the snapshot from the registry and store
    async fn collect(&self) -> Result<SystemContext, ContextError> {
        let mut components = self.registry.list_components().await?;

        // Live stored config wins over whatever the registration carried.
        let keys: Vec<String> = components
            .iter()
            .map(|c| component_config_key(c.id.as_str()))
            .collect();
        let stored =
            futures::future::try_join_all(keys.iter().map(|key| self.store.get(key))).await?;
        for (component, stored) in components.iter_mut().zip(stored) {
            if let Some(stored) = stored {
                component.config = stored;
            }
        }

        let mut available_backends = vec!["local".to_string()];
        let mut cdn_configured = false;
        for component in components.iter().filter(|c| c.active) {
            if component.declares("storage-backend") {
                available_backends.extend(component.endpoints.iter().cloned());
            }
            if component.declares("cdn") {
                cdn_configured = true;
            }
        }

        let storage = StorageInfo {
            available_backends,
            cdn_configured,
        };

        let ctx = SystemContext::from_components(components, storage);
        tracing::info!(
            components = ctx.stats().components_total,
            active = ctx.stats().components_active,
            "collected system context"
        );
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryComponentRegistry;
    use crate::store::InMemoryConfigStore;
    use crate::types::ComponentDescriptor;
    use serde_json::json;

    fn provider_with(
        registry: InMemoryComponentRegistry,
        store: InMemoryConfigStore,
    ) -> ContextProvider {
        ContextProvider::new(Arc::new(registry), Arc::new(store))
    }

    #[tokio::test]
    async fn provider_collects_components() {
        let registry = InMemoryComponentRegistry::new();
        registry.register(ComponentDescriptor::new("engine-hub").with_capability("text-generation"));

        let provider = provider_with(registry, InMemoryConfigStore::new());
        let ctx = provider.context().await.unwrap();

        assert_eq!(ctx.stats().components_total, 1);
        assert!(ctx.capability_available("text-generation"));
    }

    #[tokio::test]
    async fn provider_overlays_stored_config() {
        let registry = InMemoryComponentRegistry::new();
        registry.register(
            ComponentDescriptor::new("engine-hub").with_config(json!({"provider": "stale"})),
        );

        let store = InMemoryConfigStore::new();
        store
            .set("component:engine-hub", json!({"provider": "openai"}))
            .await
            .unwrap();

        let provider = provider_with(registry, store);
        let ctx = provider.context().await.unwrap();

        let component = ctx.component(&"engine-hub".into()).unwrap();
        assert_eq!(component.config, json!({"provider": "openai"}));
    }

    #[tokio::test]
    async fn provider_caches_within_ttl() {
        let registry = InMemoryComponentRegistry::new();
        registry.register(ComponentDescriptor::new("engine-hub"));

        let provider = provider_with(registry, InMemoryConfigStore::new());
        let first = provider.context().await.unwrap();
        let second = provider.context().await.unwrap();

        // Same Arc, not just equal content
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn provider_refresh_bypasses_cache() {
        let registry = Arc::new(InMemoryComponentRegistry::new());
        registry.register(ComponentDescriptor::new("engine-hub"));

        let provider = ContextProvider::new(registry.clone(), Arc::new(InMemoryConfigStore::new()));
        let first = provider.context().await.unwrap();
        assert_eq!(first.stats().components_total, 1);

        registry.register(ComponentDescriptor::new("peer-network"));

        // Cached snapshot still served...
        let cached = provider.context().await.unwrap();
        assert_eq!(cached.stats().components_total, 1);

        // ...until an explicit refresh
        let fresh = provider.refresh().await.unwrap();
        assert_eq!(fresh.stats().components_total, 2);

        // Refresh also repopulates the cache
        let after = provider.context().await.unwrap();
        assert!(Arc::ptr_eq(&fresh, &after));
    }

    #[tokio::test]
    async fn provider_derives_storage_info() {
        let registry = InMemoryComponentRegistry::new();
        registry.register(
            ComponentDescriptor::new("storage-service")
                .with_capability("storage-backend")
                .with_endpoint("ipfs")
                .with_endpoint("arweave"),
        );
        registry.register(ComponentDescriptor::new("cdn-edge").with_capability("cdn"));

        let provider = provider_with(registry, InMemoryConfigStore::new());
        let ctx = provider.context().await.unwrap();

        assert_eq!(ctx.storage().available_backends, vec!["local", "ipfs", "arweave"]);
        assert!(ctx.storage().cdn_configured);
    }

    #[tokio::test]
    async fn provider_unreachable_registry_fails() {
        struct DownRegistry;

        #[async_trait::async_trait]
        impl ComponentRegistry for DownRegistry {
            async fn list_components(&self) -> Result<Vec<ComponentDescriptor>, RegistryError> {
                Err(RegistryError::Unreachable("connection refused".to_string()))
            }
        }

        let provider =
            ContextProvider::new(Arc::new(DownRegistry), Arc::new(InMemoryConfigStore::new()));
        let err = provider.context().await.unwrap_err();
        assert!(matches!(err, ContextError::Unavailable(_)));
    }
}
